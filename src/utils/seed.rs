// snippet-service/src/utils/seed.rs
//
// Demo data for local development: three users (admin, manager, rep) and a
// handful of published sales snippets. Enabled with SEED_DEMO_DATA=true.
use crate::models::{CreateSnippetRequest, Requester, Role, Scope, ServiceError, Status, User};
use crate::services::SnippetEngine;
use crate::utils::password;
use chrono::Utc;
use log::info;
use uuid::Uuid;

struct DemoSnippet {
    name: &'static str,
    body: &'static str,
    shortcut: &'static str,
    category: &'static str,
    scope: Scope,
    tags: &'static str,
}

pub fn seed_demo_data(engine: &SnippetEngine) -> Result<(), ServiceError> {
    if engine.store().find_user_by_email("admin@example.com")?.is_some() {
        info!("Demo data already present, skipping seed");
        return Ok(());
    }

    let admin = seed_user(engine, "admin@example.com", "admin123", "Admin User", Role::Admin, None)?;
    let rep = seed_user(engine, "user@example.com", "user123", "Sales Rep", Role::User, Some("team-1"))?;
    let manager = seed_user(engine, "manager@example.com", "manager123", "Sales Manager", Role::Manager, Some("team-1"))?;

    let demos = [
        (
            &rep,
            DemoSnippet {
                name: "Intro - Product Demo",
                body: "Hi {{first_name}},\n\nI hope this email finds you well. I'd love to show you how {{product_name}} can help {{company_name}} achieve {{benefit}}.\n\nWould you be available for a quick 15-minute demo this week?",
                shortcut: "/intro-demo",
                category: "Introduction",
                scope: Scope::Personal,
                tags: "intro,demo,product",
            },
        ),
        (
            &manager,
            DemoSnippet {
                name: "Value Prop - Time Savings",
                body: "Our platform helps teams save {{hours}} hours per week by automating {{task_type}}. This translates to {{cost_savings}} in operational costs annually.",
                shortcut: "/value-time",
                category: "Value Proposition",
                scope: Scope::Team,
                tags: "value,time-savings,automation",
            },
        ),
        (
            &rep,
            DemoSnippet {
                name: "Objection - Pricing",
                body: "I understand pricing is a concern. Let me share that {{customer_name}} saw a {{roi}}% ROI in the first quarter. We also offer flexible pricing plans that scale with your needs.\n\nWould you like to see a detailed cost breakdown?",
                shortcut: "/objection-pricing",
                category: "Objection Handling",
                scope: Scope::Personal,
                tags: "objection,pricing,roi",
            },
        ),
        (
            &manager,
            DemoSnippet {
                name: "Follow-up - No Response",
                body: "Hi {{first_name}},\n\nI wanted to follow up on my previous email about {{topic}}. I know you're busy, so I'll keep this brief.\n\nWould a quick {{duration}}-minute call work better for you?",
                shortcut: "/followup",
                category: "Follow-up",
                scope: Scope::Org,
                tags: "followup,no-response",
            },
        ),
        (
            &rep,
            DemoSnippet {
                name: "Meeting Request",
                body: "Hi {{first_name}},\n\nI'd love to schedule a call to discuss how we can help {{company_name}}. Are you available for a {{duration}}-minute conversation on {{day}}?",
                shortcut: "/meeting",
                category: "Meeting Request",
                scope: Scope::Personal,
                tags: "meeting,request",
            },
        ),
    ];

    for (owner, demo) in demos {
        let snippet = engine.create(
            owner,
            CreateSnippetRequest {
                name: demo.name.to_string(),
                body: demo.body.to_string(),
                shortcut: Some(demo.shortcut.to_string()),
                category: Some(demo.category.to_string()),
                scope: Some(demo.scope),
                status: Some(Status::Published),
                tags: Some(demo.tags.to_string()),
            },
        )?;
        info!("Seeded snippet: {} ({})", snippet.name, snippet.id);
    }

    info!("✅ Demo data seeded successfully");
    Ok(())
}

fn seed_user(
    engine: &SnippetEngine,
    email: &str,
    pass: &str,
    name: &str,
    role: Role,
    team_id: Option<&str>,
) -> Result<Requester, ServiceError> {
    let user = User {
        id: Uuid::new_v4().to_string(),
        email: email.to_string(),
        password_hash: password::hash_password(pass)?,
        name: name.to_string(),
        role,
        team_id: team_id.map(|t| t.to_string()),
        created_at: Utc::now(),
    };

    engine.store().save_user(&user)?;

    Ok(Requester {
        user_id: user.id,
        role,
        team_id: user.team_id,
    })
}
