//! Debug-draw demo entry point
//!
//! Usage: `dd-demo [full|showcase|moving]`. A scene argument replaces the
//! configured demo scene.

use dd_frontend::config::{DemoScene, SharedConfig, create_shared_config};

fn main() -> eframe::Result<()> {
    init_tracing();

    let config = create_shared_config();
    if let Some(name) = std::env::args().nth(1) {
        select_scene(&config, &name);
    }

    let (window_size, scene) = {
        let config = config.read();
        let viewer = &config.config().viewer;
        (viewer.window_size, viewer.scene)
    };
    tracing::info!(
        ?scene,
        config = %config.read().config_file_path().display(),
        "Starting debug-draw demo"
    );

    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size(window_size)
            .with_min_inner_size([640.0, 480.0])
            .with_title(format!("Debug Draw - {:?}", scene)),
        wgpu_options: wgpu_options(),
        ..Default::default()
    };

    eframe::run_native(
        "dd-demo",
        native_options,
        Box::new(move |cc| Ok(Box::new(dd_frontend::DebugDrawApp::new(cc, config)))),
    )
}

fn init_tracing() {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "dd_frontend=debug,dd_core=info,dd_renderer=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn select_scene(config: &SharedConfig, name: &str) {
    match DemoScene::from_name(name) {
        Some(scene) => config.write().config_mut().viewer.scene = scene,
        None => tracing::warn!("Unknown demo scene `{}`, keeping the configured one", name),
    }
}

/// GL unless `WGPU_BACKEND` says otherwise; the viewport target may be as
/// large as the adapter allows.
fn wgpu_options() -> egui_wgpu::WgpuConfiguration {
    let backends = wgpu::util::backend_bits_from_env().unwrap_or(wgpu::Backends::GL);

    egui_wgpu::WgpuConfiguration {
        wgpu_setup: egui_wgpu::WgpuSetup::CreateNew {
            supported_backends: backends,
            power_preference: wgpu::PowerPreference::LowPower,
            device_descriptor: std::sync::Arc::new(|adapter| wgpu::DeviceDescriptor {
                label: Some("dd-demo device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::downlevel_webgl2_defaults()
                    .using_resolution(adapter.limits()),
                memory_hints: wgpu::MemoryHints::default(),
            }),
        },
        ..Default::default()
    }
}
