use std::sync::Once;

use windows::Win32::Foundation::HMODULE;
use windows::Win32::System::LibraryLoader::GetProcAddress;
use windows::core::s;

use crate::libraries;

const USER32: &str = "user32.dll";

/// `DPI_AWARENESS_CONTEXT_PER_MONITOR_AWARE_V2`
const PER_MONITOR_AWARE_V2: isize = -4;

type SetProcessDpiAwarenessContext = unsafe extern "system" fn(isize) -> i32;

static ENABLE: Once = Once::new();

/// Declares this process as per-monitor DPI aware (V2), once.
///
/// Without this, Windows scales coordinates based on the primary
/// monitor's DPI, which gives wrong positions and sizes on mixed-DPI
/// setups. The entry point only exists on Windows 10 1703 and later, so it
/// is resolved from `user32.dll` through the library registry; on older
/// systems this does nothing.
pub fn enable_dpi_awareness() {
    ENABLE.call_once(|| {
        let Some(user32) = libraries().load(USER32) else {
            crux_core::log_warn!("{USER32} unavailable, skipping DPI awareness");
            return;
        };

        // SAFETY: the module handle stays valid while the registry holds it.
        let proc = unsafe {
            GetProcAddress(HMODULE(user32.as_ptr()), s!("SetProcessDpiAwarenessContext"))
        };
        let Some(proc) = proc else {
            crux_core::log_debug!("SetProcessDpiAwarenessContext not found");
            return;
        };

        // SAFETY: the exported function has this exact signature.
        let set_context: SetProcessDpiAwarenessContext = unsafe { std::mem::transmute(proc) };

        // Fails harmlessly if awareness was already set (e.g. via manifest).
        if unsafe { set_context(PER_MONITOR_AWARE_V2) } == 0 {
            crux_core::log_debug!("DPI awareness already configured");
        }
    });
}
