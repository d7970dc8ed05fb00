#[cfg(not(target_arch = "wasm32"))]
fn main() -> eframe::Result {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .compact()
        .try_init();
    factbook_ui::run_native()
}

#[cfg(target_arch = "wasm32")]
fn main() {}
