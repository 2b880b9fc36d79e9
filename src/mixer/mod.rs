/*
 *  mixer/mod.rs
 *
 *  LCDvu - worth the squeeze
 *  (c) 2020-26 Stuart Hunter
 *
 *  Volume sampling from the system audio mixer
 *
 *  This program is free software: you can redistribute it and/or modify
 *  it under the terms of the GNU General Public License as published by
 *  the Free Software Foundation, either version 3 of the License, or
 *  (at your option) any later version.
 *
 *  This program is distributed in the hope that it will be useful,
 *  but WITHOUT ANY WARRANTY; without even the implied warranty of
 *  MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 *  GNU General Public License for more details.
 *
 *  See <http://www.gnu.org/licenses/> to get a copy of the GNU General
 *  Public License.
 *
 */

use log::{debug, info, warn};
use thiserror::Error;

use crate::config::{MixerBackend, MixerConfig};

pub mod amixer;

#[cfg(feature = "alsa-mixer")]
pub mod alsa;

/// Mixer failures. None of these ever reach the display, they only
/// decide how a zero reading gets logged.
#[derive(Debug, Error)]
pub enum MixerError {
    #[error("mixer unavailable: {0}")]
    Unavailable(String),
    #[error("mixer read failed: {0}")]
    Read(String),
    #[error("mixer reported no channels")]
    NoChannels,
    #[error("unexpected mixer output: {0}")]
    Parse(String),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Per-channel volume source
pub trait Mixer {
    /// Current volume of each playback channel as a percentage.
    /// Mono controls return a single value.
    fn channel_volumes(&mut self) -> Result<Vec<u8>, MixerError>;

    /// Short description for logging
    fn describe(&self) -> String;
}

pub type BoxedMixer = Box<dyn Mixer>;

/// Left/right volume percentages for one tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct VolumeReading {
    pub left: u8,
    pub right: u8,
}

impl VolumeReading {
    pub fn new(left: u8, right: u8) -> Self {
        Self { left: left.min(100), right: right.min(100) }
    }

    pub fn silent() -> Self {
        Self::default()
    }

    /// First value is left, second right, a lone value feeds both.
    pub fn from_channels(volumes: &[u8]) -> Result<Self, MixerError> {
        match volumes {
            [] => Err(MixerError::NoChannels),
            [mono] => Ok(Self::new(*mono, *mono)),
            [left, right, ..] => Ok(Self::new(*left, *right)),
        }
    }
}

/// What a sample actually saw. The display only ever uses `reading()`,
/// which folds both failure kinds into silence.
#[derive(Debug)]
pub enum SampleOutcome {
    Reading(VolumeReading),
    NoMixer,
    ReadFailed(MixerError),
}

impl SampleOutcome {
    pub fn reading(&self) -> VolumeReading {
        match self {
            SampleOutcome::Reading(r) => *r,
            SampleOutcome::NoMixer | SampleOutcome::ReadFailed(_) => VolumeReading::silent(),
        }
    }
}

/// Reads the mixer once per tick, never fails
pub struct VolumeSampler {
    mixer: Option<BoxedMixer>,
    healthy: bool,
}

impl VolumeSampler {
    pub fn new(mixer: BoxedMixer) -> Self {
        Self { mixer: Some(mixer), healthy: true }
    }

    /// Sampler with volume reads disabled, every sample is (0,0)
    pub fn disabled() -> Self {
        Self { mixer: None, healthy: false }
    }

    /// Open the configured backend. A mixer that cannot be opened leaves
    /// the sampler disabled rather than stopping the meter.
    pub fn from_config(config: &MixerConfig) -> Self {
        match open_mixer(config) {
            Ok(Some(mixer)) => {
                info!("Sampling volume from {}", mixer.describe());
                Self::new(mixer)
            }
            Ok(None) => {
                info!("No mixer configured, meter will stay blank");
                Self::disabled()
            }
            Err(e) => {
                warn!("Mixer unavailable, volume reads disabled: {}", e);
                Self::disabled()
            }
        }
    }

    pub fn has_mixer(&self) -> bool {
        self.mixer.is_some()
    }

    pub fn poll(&mut self) -> SampleOutcome {
        let Some(mixer) = self.mixer.as_mut() else {
            return SampleOutcome::NoMixer;
        };

        let outcome = match mixer.channel_volumes() {
            Ok(volumes) => match VolumeReading::from_channels(&volumes) {
                Ok(reading) => SampleOutcome::Reading(reading),
                Err(e) => SampleOutcome::ReadFailed(e),
            },
            Err(e) => SampleOutcome::ReadFailed(e),
        };

        // log transitions only, a dead mixer polled at 10Hz would flood the log
        match (&outcome, self.healthy) {
            (SampleOutcome::ReadFailed(e), true) => {
                warn!("Mixer read failed, showing silence: {}", e);
                self.healthy = false;
            }
            (SampleOutcome::ReadFailed(e), false) => debug!("Mixer read failed: {}", e),
            (SampleOutcome::Reading(_), false) => {
                info!("Mixer reads recovered");
                self.healthy = true;
            }
            _ => {}
        }
        outcome
    }

    pub fn sample(&mut self) -> VolumeReading {
        self.poll().reading()
    }
}

/// Build the backend named in the config. `Ok(None)` means no mixer was asked for.
pub fn open_mixer(config: &MixerConfig) -> Result<Option<BoxedMixer>, MixerError> {
    let card = config.card();
    let control = config.control();
    match config.backend() {
        MixerBackend::None => Ok(None),
        MixerBackend::Amixer => {
            let mixer = amixer::AmixerMixer::open(card, control)?;
            Ok(Some(Box::new(mixer)))
        }
        #[cfg(feature = "alsa-mixer")]
        MixerBackend::Alsa => {
            let mixer = alsa::AlsaMixer::open(card, control)?;
            Ok(Some(Box::new(mixer)))
        }
        #[cfg(not(feature = "alsa-mixer"))]
        MixerBackend::Alsa => Err(MixerError::Unavailable(
            "built without the alsa-mixer feature, use the amixer backend".to_string(),
        )),
    }
}
