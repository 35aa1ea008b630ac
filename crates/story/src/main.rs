use std::path::PathBuf;

use anyhow::Context as _;
use gpui::*;
use gpui_component::Root;
use gpui_nav_tree::DragConfig;

mod nav_tree;

use nav_tree::NavTreeExample;

/// Drag tuning from the JSON file named by the first argument, if any.
fn load_config() -> anyhow::Result<DragConfig> {
    let Some(path) = std::env::args_os().nth(1).map(PathBuf::from) else {
        return Ok(DragConfig::default());
    };
    let json = std::fs::read_to_string(&path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    DragConfig::from_json(&json)
        .with_context(|| format!("invalid drag config in {}", path.display()))
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let config = load_config()?;
    let long_press_drag = std::env::var_os("NAV_TREE_LONG_PRESS").is_some();
    log::debug!("starting with {config:?}, long press drag: {long_press_drag}");

    let app = Application::new();

    app.run(move |cx| {
        gpui_component::init(cx);
        cx.activate(true);

        cx.spawn(async move |cx| {
            cx.open_window(
                WindowOptions {
                    titlebar: Some(TitlebarOptions {
                        title: Some("Navigation Tree".into()),
                        appears_transparent: false,
                        traffic_light_position: None,
                    }),
                    ..Default::default()
                },
                |window, cx| {
                    let view = NavTreeExample::view(config, long_press_drag, window, cx);
                    cx.new(|cx| Root::new(view, window, cx))
                },
            )?;

            Ok::<_, anyhow::Error>(())
        })
        .detach();
    });

    Ok(())
}
