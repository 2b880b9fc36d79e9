/*
 *  mixer/alsa.rs
 *
 *  LCDvu - worth the squeeze
 *  (c) 2020-26 Stuart Hunter
 *
 *  Native ALSA simple mixer element backend
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

use alsa::mixer::{Mixer as AlsaHandle, SelemChannelId, SelemId};
use log::debug;

use super::{Mixer, MixerError};

pub struct AlsaMixer {
    handle: AlsaHandle,
    card: String,
    control: String,
}

impl AlsaMixer {
    pub fn open(card: &str, control: &str) -> Result<Self, MixerError> {
        let handle = AlsaHandle::new(card, false)
            .map_err(|e| MixerError::Unavailable(format!("card {}: {}", card, e)))?;

        {
            let selem = handle
                .find_selem(&SelemId::new(control, 0))
                .ok_or_else(|| MixerError::Unavailable(format!("no control '{}' on {}", control, card)))?;
            if !selem.has_playback_volume() {
                return Err(MixerError::Unavailable(format!("'{}' has no playback volume", control)));
            }
            let (min, max) = selem.get_playback_volume_range();
            debug!("ALSA {} on {} range {}..{}", control, card, min, max);
        }

        Ok(Self {
            handle,
            card: card.to_string(),
            control: control.to_string(),
        })
    }
}

/// Raw element volume to a rounded percentage of its range
pub(crate) fn raw_to_percent(raw: i64, min: i64, max: i64) -> u8 {
    if max <= min {
        return 0;
    }
    let span = (max - min) as f64;
    let pct = ((raw.clamp(min, max) - min) as f64 * 100.0 / span).round();
    pct as u8
}

impl Mixer for AlsaMixer {
    fn channel_volumes(&mut self) -> Result<Vec<u8>, MixerError> {
        // pick up volume changes made by other clients since the last read
        self.handle
            .handle_events()
            .map_err(|e| MixerError::Read(e.to_string()))?;

        let selem = self
            .handle
            .find_selem(&SelemId::new(&self.control, 0))
            .ok_or_else(|| MixerError::Read(format!("control '{}' went away", self.control)))?;
        let (min, max) = selem.get_playback_volume_range();

        let channels: &[SelemChannelId] = if selem.is_playback_mono() {
            // ALSA reports mono elements on the front left slot
            &[SelemChannelId::FrontLeft]
        } else {
            &[SelemChannelId::FrontLeft, SelemChannelId::FrontRight]
        };

        let mut volumes = Vec::with_capacity(channels.len());
        for &channel in channels {
            if !selem.has_playback_channel(channel) {
                continue;
            }
            let raw = selem
                .get_playback_volume(channel)
                .map_err(|e| MixerError::Read(e.to_string()))?;
            volumes.push(raw_to_percent(raw, min, max));
        }
        Ok(volumes)
    }

    fn describe(&self) -> String {
        format!("ALSA control '{}' on card '{}'", self.control, self.card)
    }
}
