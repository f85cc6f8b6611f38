//! Textos de los avisos que se envían a los canales.

use crate::audio::queue::Track;

pub const QUEUE_COMPLETE: &str = "Queue playback complete";
pub const PAUSED: &str = "Playback paused";
pub const RESUMED: &str = "Playback resumed";

pub fn now_playing(track: &Track) -> String {
    format!(
        "\n\n`Now playing:` {}\n`Link:` {}\n`Channel:` {}",
        track.title, track.link, track.channel
    )
}

pub fn now_repeating(track: &Track) -> String {
    format!("`Now repeating:` {}", track.title)
}

pub fn added_to_queue(title: &str) -> String {
    format!("{title} added to the queue")
}

pub fn repeat_status(repeating: bool) -> String {
    let mode = if repeating { "on" } else { "off" };
    format!("Repeat current audio: `{mode}`")
}

pub fn volume_set(percent: f32) -> String {
    format!("volume set to {percent}%")
}

/// Vista de la cola en un bloque markdown: cabecera con repetición y
/// volumen, y los títulos numerados en orden de reproducción.
pub fn queue_overview<'a>(
    tracks: impl Iterator<Item = &'a Track>,
    repeating: bool,
    volume: f32,
) -> String {
    let repeat = if repeating { "on" } else { "off" };
    let percent = (volume * 100.0).round() as u32;

    let mut overview =
        format!("```md\ncurrently playing ↴  repeat: {repeat}  volume: {percent}%\n");
    for (index, track) in tracks.enumerate() {
        overview.push_str(&format!("{}. {}\n", index + 1, track.title));
    }
    overview.push_str("```");
    overview
}
