use bistro_hex::application::checkout_service::{CheckoutConfig, CheckoutService};
use bistro_hex::config::Config;
use bistro_hex::inbound::http::{HttpServer, HttpServerConfig};
use bistro_mail::SmtpConfig;
use bistro_paypal::{PaypalClient, PaypalCredentials, PaypalEnv};
use bistro_store::{build_store, Store};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env for PayPal/SMTP settings when present.
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt()
        .with_env_filter(std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()))
        .init();

    let config = Config::from_env()?;

    let store: Store = build_store(Some(&config.store.orders_file)).await?;

    if !config.paypal.is_configured() {
        tracing::warn!(
            "PAYPAL_CLIENT_ID / PAYPAL_CLIENT_SECRET are missing, payment calls will fail"
        );
    }
    let credentials = match (&config.paypal.client_id, &config.paypal.client_secret) {
        (Some(client_id), Some(client_secret)) => Some(PaypalCredentials {
            client_id: client_id.clone(),
            client_secret: client_secret.clone(),
        }),
        _ => None,
    };
    let gateway = PaypalClient::builder(PaypalEnv::from_name(&config.paypal.environment))
        .with_optional_credentials(credentials)
        .with_currency(config.paypal.currency.clone())
        .with_brand_name(config.restaurant_name.clone())
        .build()?;

    if config.mail.smtp.is_none() {
        tracing::warn!("SMTP configuration incomplete, order mails will not be sent");
    }
    let smtp = config.mail.smtp.as_ref().map(|s| SmtpConfig {
        host: s.host.clone(),
        port: s.port,
        secure: s.secure,
        user: s.user.clone(),
        password: s.password.clone(),
        from: s.from.clone(),
    });
    let mailer = bistro_mail::build_mailer(smtp.as_ref())?;

    let service = CheckoutService::new(
        store,
        gateway,
        mailer,
        CheckoutConfig {
            currency: config.paypal.currency.clone(),
            restaurant_name: config.restaurant_name.clone(),
            operator_email: config.mail.operator_email.clone(),
        },
    );

    let server_cfg = HttpServerConfig {
        port: config.server.port.clone(),
        public_dir: config.server.public_dir.clone(),
    };

    let http = HttpServer::new(service, server_cfg).await?;
    http.run().await
}
