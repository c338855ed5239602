use notify_rust::{Notification, Urgency};
use tracing::debug;

const SOUNDS: [(&str, &str); 3] = [
    ("paplay", "/usr/share/sounds/freedesktop/stereo/complete.oga"),
    ("aplay", "/usr/share/sounds/sound-icons/guitar-11.wav"),
    ("aplay", "/usr/share/sounds/generic.wav"),
];

/// Desktop notification for a finished timer, optionally with a chime.
pub fn timer_done(name: &str, sound: bool) {
    let shown = Notification::new()
        .summary("Timer done ⏰")
        .body(&format!("\"{}\" has finished.", name))
        .appname("rcountdown")
        .icon("alarm-clock")
        .urgency(Urgency::Critical)
        .show();
    if let Err(e) = shown {
        debug!("notification not shown: {}", e);
    }

    if sound {
        std::thread::spawn(|| {
            for (cmd, file) in SOUNDS {
                if std::path::Path::new(file).exists() {
                    let _ = std::process::Command::new(cmd)
                        .arg(file)
                        .stdout(std::process::Stdio::null())
                        .stderr(std::process::Stdio::null())
                        .spawn();
                    break;
                }
            }
        });
    }
}
