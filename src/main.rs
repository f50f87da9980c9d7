use moonlit::{MoonlitApp, ViewerConfig};

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let app = MoonlitApp::new(ViewerConfig::default())?;
    app.run()
}
