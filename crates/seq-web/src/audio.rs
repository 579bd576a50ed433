//! WebAudio playback for a session's tracks.
//!
//! One looping media element per note plus an optional background track, all
//! routed through per-track gains into a master gain. Muting is gain-only so
//! every element keeps the shared transport position; play/pause always act
//! on the whole set.

use wasm_bindgen_futures::{spawn_local, JsFuture};
use web_sys as web;

use seq_core::constants::{DEFAULT_MASTER_VOLUME, GAIN_RAMP_SEC};
use seq_core::{GridEffect, MusicConfig};

struct AudioTrack {
    note: u32,
    element: web::HtmlAudioElement,
    gain: web::GainNode,
}

pub struct AudioEngine {
    ctx: web::AudioContext,
    master: web::GainNode,
    background: Option<web::HtmlAudioElement>,
    tracks: Vec<AudioTrack>,
}

impl AudioEngine {
    /// Build the audio graph for a config, appending the media elements to
    /// `container`.
    pub fn create(config: &MusicConfig, container: &web::Element) -> anyhow::Result<Self> {
        let ctx = web::AudioContext::new().map_err(|e| anyhow::anyhow!("AudioContext: {e:?}"))?;
        let master =
            web::GainNode::new(&ctx).map_err(|e| anyhow::anyhow!("master gain: {e:?}"))?;
        master.gain().set_value(DEFAULT_MASTER_VOLUME);
        master
            .connect_with_audio_node(&ctx.destination())
            .map_err(|e| anyhow::anyhow!("master connect: {e:?}"))?;

        let mut numbers: Vec<u32> = config.audio_files.keys().copied().collect();
        numbers.sort_unstable();
        let mut tracks = Vec::with_capacity(numbers.len());
        for note in numbers {
            let Some(src) = config.audio_file(note) else {
                continue;
            };
            tracks.push(build_track(&ctx, &master, note, src, container)?);
        }

        let background = match config.background_music.as_deref() {
            Some(src) => Some(build_background(&ctx, &master, src, container)?),
            None => None,
        };

        Ok(Self {
            ctx,
            master,
            background,
            tracks,
        })
    }

    /// Begin (or re-align) playback of every element at a shared position.
    /// Autoplay rejection is logged and leaves state untouched; the next user
    /// gesture can simply retry.
    pub fn start(&self, from_beginning: bool) {
        _ = self.ctx.resume();
        let offset = if from_beginning {
            0.0
        } else {
            self.transport_position()
        };
        for element in self.elements() {
            element.set_current_time(offset);
            play_logged(&element);
        }
    }

    /// Pause and rewind every element. Safe to call when already stopped.
    pub fn stop(&self) {
        for element in self.elements() {
            _ = element.pause();
            element.set_current_time(0.0);
        }
    }

    pub fn enable(&self, note: u32) {
        self.ramp_to(note, 1.0);
    }

    pub fn disable(&self, note: u32) {
        self.ramp_to(note, 0.0);
    }

    pub fn apply(&self, effect: GridEffect) {
        match effect {
            GridEffect::NoteActivated(note) => self.enable(note),
            GridEffect::NoteDeactivated(note) => self.disable(note),
        }
    }

    pub fn set_global_volume(&self, volume: f32) {
        self.master.gain().set_value(volume.clamp(0.0, 1.0));
    }

    /// Remove this engine's media elements from the page and release the
    /// context. Used on configuration switches.
    pub fn teardown(&self) {
        self.stop();
        for element in self.elements() {
            element.remove();
        }
        _ = self.ctx.close();
    }

    /// The shared transport position, read from the background element when
    /// present, else the first note track.
    fn transport_position(&self) -> f64 {
        self.background
            .as_ref()
            .map(|el| el.current_time())
            .or_else(|| self.tracks.first().map(|t| t.element.current_time()))
            .unwrap_or(0.0)
    }

    fn elements(&self) -> impl Iterator<Item = web::HtmlAudioElement> + '_ {
        self.background
            .iter()
            .cloned()
            .chain(self.tracks.iter().map(|t| t.element.clone()))
    }

    fn ramp_to(&self, note: u32, target: f32) {
        let Some(track) = self.tracks.iter().find(|t| t.note == note) else {
            log::warn!("gain ramp for unknown note {note} ignored");
            return;
        };
        let gain = track.gain.gain();
        let now = self.ctx.current_time();
        _ = gain.cancel_scheduled_values(now);
        _ = gain.set_value_at_time(gain.value(), now);
        _ = gain.linear_ramp_to_value_at_time(target, now + GAIN_RAMP_SEC);
    }
}

fn build_track(
    ctx: &web::AudioContext,
    master: &web::GainNode,
    note: u32,
    src: &str,
    container: &web::Element,
) -> anyhow::Result<AudioTrack> {
    let element = new_media_element(src, container)?;
    let source = ctx
        .create_media_element_source(&element)
        .map_err(|e| anyhow::anyhow!("media source for note {note}: {e:?}"))?;
    let gain = web::GainNode::new(ctx).map_err(|e| anyhow::anyhow!("gain {note}: {e:?}"))?;
    gain.gain().set_value(0.0);
    source
        .connect_with_audio_node(&gain)
        .map_err(|e| anyhow::anyhow!("source connect {note}: {e:?}"))?;
    gain.connect_with_audio_node(master)
        .map_err(|e| anyhow::anyhow!("gain connect {note}: {e:?}"))?;
    Ok(AudioTrack {
        note,
        element,
        gain,
    })
}

fn build_background(
    ctx: &web::AudioContext,
    master: &web::GainNode,
    src: &str,
    container: &web::Element,
) -> anyhow::Result<web::HtmlAudioElement> {
    let element = new_media_element(src, container)?;
    let source = ctx
        .create_media_element_source(&element)
        .map_err(|e| anyhow::anyhow!("background media source: {e:?}"))?;
    source
        .connect_with_audio_node(master)
        .map_err(|e| anyhow::anyhow!("background connect: {e:?}"))?;
    Ok(element)
}

fn new_media_element(src: &str, container: &web::Element) -> anyhow::Result<web::HtmlAudioElement> {
    let element = web::HtmlAudioElement::new_with_src(src)
        .map_err(|e| anyhow::anyhow!("audio element {src}: {e:?}"))?;
    element.set_loop(true);
    element.set_preload("auto");
    container
        .append_child(&element)
        .map_err(|e| anyhow::anyhow!("append audio element: {e:?}"))?;
    Ok(element)
}

fn play_logged(element: &web::HtmlAudioElement) {
    match element.play() {
        Ok(promise) => spawn_local(async move {
            if let Err(e) = JsFuture::from(promise).await {
                log::warn!("audio play rejected: {:?}", e);
            }
        }),
        Err(e) => log::warn!("audio play failed: {:?}", e),
    }
}
