use chrono::Utc;
use client::{FixtureBackend, RestBackend};
use engine::metrics::{self, SpendingPeriod};
use engine::{Backend, EngineError, Gate};

mod settings;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let settings = settings::Settings::new()?;

    tracing_subscriber::fmt()
        .with_env_filter(format!(
            "dompet={level},client={level},engine={level}",
            level = settings.app.level
        ))
        .init();

    let (email, password) = match settings.demo {
        Some(demo) => (demo.email, demo.password),
        None => ("demo@example.com".to_string(), "password".to_string()),
    };

    match settings.backend {
        Some(backend) => {
            tracing::info!("Found backend settings...");
            let backend = RestBackend::new(&backend.url, &backend.api_key)?;
            run_session(Gate::new(backend), &email, &password).await?;
        }
        None if settings.app.profile == "development" => {
            tracing::warn!("no [backend] settings, using seeded fixture data");
            run_session(Gate::new(FixtureBackend::seeded()), &email, &password).await?;
        }
        None => {
            return Err(format!(
                "missing [backend] settings (profile {})",
                settings.app.profile
            )
            .into());
        }
    }

    Ok(())
}

/// Opens a session, logs a small dashboard and closes it again.
async fn run_session<B: Backend>(
    mut gate: Gate<B>,
    email: &str,
    password: &str,
) -> Result<(), EngineError> {
    let user = gate.sign_in(email, password).await?;
    tracing::info!(user = %user.id, name = %user.name, "session open");

    let today = Utc::now().date_naive();
    let snapshot = gate.snapshot()?;

    tracing::info!(
        accounts = snapshot.accounts.len(),
        balance_minor = metrics::total_balance(snapshot),
        "loaded accounts"
    );
    for bill in metrics::upcoming_bills(snapshot, 7, today) {
        tracing::info!(
            name = %bill.name,
            due = %bill.next_occurrence(today),
            amount_minor = bill.amount_minor,
            "upcoming bill"
        );
    }
    let flows = metrics::flow_totals(snapshot, SpendingPeriod::Month, today);
    tracing::info!(
        income_minor = flows.income_minor,
        expense_minor = flows.expense_minor,
        net_minor = flows.net_minor(),
        "last month"
    );

    gate.sign_out().await?;
    tracing::info!("session closed");
    Ok(())
}
