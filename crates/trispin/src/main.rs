use anyhow::Context;
use trispin_engine::device::GpuInit;
use trispin_engine::logging::{init_logging, LoggingConfig};
use trispin_engine::window::{WindowConfig, WinitPlatform};
use trispin_engine::Application;

fn main() -> anyhow::Result<()> {
    init_logging(LoggingConfig::default());

    let platform = WinitPlatform::new(GpuInit::default());
    let mut app = Application::new(platform, WindowConfig::default());

    app.run().context("triangle application failed")?;

    log::info!("window closed");
    Ok(())
}
