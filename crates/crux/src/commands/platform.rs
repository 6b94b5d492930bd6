use crux::{TARGET_PLATFORM, WindowFactory};

pub fn execute() {
    println!("Target platform: {TARGET_PLATFORM}");

    if WindowFactory::is_supported() {
        println!("Window backend: {TARGET_PLATFORM}");
    } else {
        println!("Window backend: none (window creation is not supported)");
    }
}
