use clap::Args;

use crux::{TARGET_PLATFORM, WindowFactory, WindowProperties, config};

/// Arguments for the `create` subcommand.
///
/// Anything left out comes from the `[window]` table of `config.toml`.
#[derive(Args, Debug, Default)]
pub struct CreateArgs {
    /// Window title
    #[arg(long)]
    title: Option<String>,
    /// Width in pixels
    #[arg(long)]
    width: Option<u32>,
    /// Height in pixels
    #[arg(long)]
    height: Option<u32>,
    /// X position in pixels (negative means unspecified)
    #[arg(long, allow_negative_numbers = true)]
    x: Option<i32>,
    /// Y position in pixels (negative means unspecified)
    #[arg(long, allow_negative_numbers = true)]
    y: Option<i32>,
    /// Let the OS place unspecified axes instead of centering them
    #[arg(long)]
    no_center: bool,
    /// Print the window properties as JSON
    #[arg(long)]
    json: bool,
}

impl CreateArgs {
    /// Overlays the command-line values onto `props`.
    fn apply(&self, mut props: WindowProperties) -> WindowProperties {
        if let Some(title) = &self.title {
            props.title = title.clone();
        }
        if let Some(width) = self.width {
            props.width = width;
        }
        if let Some(height) = self.height {
            props.height = height;
        }
        if let Some(x) = self.x {
            props.position_x = x;
        }
        if let Some(y) = self.y {
            props.position_y = y;
        }
        if self.no_center {
            props.position_centered = false;
        }
        props
    }
}

pub fn execute(args: &CreateArgs) {
    let config = config::load();
    crux::log::init(&config.logging);

    let props = args.apply(config.window);

    let window = match WindowFactory::try_create(&props) {
        Ok(window) => window,
        Err(_) if !WindowFactory::is_supported() => {
            eprintln!("Window creation is not supported on this platform ({TARGET_PLATFORM})");
            std::process::exit(1);
        }
        Err(e) => {
            eprintln!("Error: could not create window: {e}");
            crux::shutdown();
            std::process::exit(1);
        }
    };

    println!("Window created successfully!");

    let props = window.properties();
    if args.json {
        match serde_json::to_string_pretty(&props) {
            Ok(json) => println!("{json}"),
            Err(e) => eprintln!("Error: could not serialize properties: {e}"),
        }
    } else {
        println!(
            "Window Properties: W={} H={} X={} Y={}",
            props.width, props.height, props.position_x, props.position_y
        );
    }

    drop(window);
    crux::shutdown();
}
