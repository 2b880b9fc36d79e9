/*
 *  mixer/amixer.rs
 *
 *  LCDvu - worth the squeeze
 *  (c) 2020-26 Stuart Hunter
 *
 *  Mixer backend that asks alsa-utils' amixer for the control state
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

use std::process::Command;

use log::debug;

use super::{Mixer, MixerError};

/// Runs `amixer -D <card> sget <control>` on every read.
///
/// That is one fork/exec per tick, ten a second at the default refresh,
/// a few milliseconds of CPU each on a Pi. Build with `alsa-mixer` to read
/// the element in-process instead; this backend needs nothing at build
/// time, which keeps cross builds for the Pi simple.
#[derive(Debug, Clone)]
pub struct AmixerMixer {
    card: String,
    control: String,
}

impl AmixerMixer {
    /// Probe the control once so a missing card or control is reported
    /// at startup instead of as a silent meter.
    pub fn open(card: &str, control: &str) -> Result<Self, MixerError> {
        let mut mixer = Self {
            card: card.to_string(),
            control: control.to_string(),
        };
        let volumes = mixer
            .channel_volumes()
            .map_err(|e| MixerError::Unavailable(format!("{} on {}: {}", control, card, e)))?;
        debug!("amixer {} on {} has {} playback channel(s)", control, card, volumes.len());
        Ok(mixer)
    }

    fn query(&self) -> Result<String, MixerError> {
        let output = Command::new("amixer")
            .args(["-D", &self.card, "sget", &self.control])
            .output()?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(MixerError::Read(stderr.trim().to_string()));
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

impl Mixer for AmixerMixer {
    fn channel_volumes(&mut self) -> Result<Vec<u8>, MixerError> {
        let text = self.query()?;
        parse_playback_volumes(&text)
    }

    fn describe(&self) -> String {
        format!("amixer control '{}' on card '{}'", self.control, self.card)
    }
}

/// Pull the `[NN%]` value out of every playback channel line, in the
/// order amixer lists them (Front Left before Front Right).
pub fn parse_playback_volumes(text: &str) -> Result<Vec<u8>, MixerError> {
    let volumes: Vec<u8> = text
        .lines()
        .filter_map(|line| line.trim().split_once(':'))
        .filter(|(_, rest)| rest.trim_start().starts_with("Playback"))
        .filter_map(|(_, rest)| rest.split_whitespace().find_map(percent_token))
        .collect();

    if volumes.is_empty() {
        return Err(MixerError::Parse("no playback volume in amixer output".to_string()));
    }
    Ok(volumes)
}

fn percent_token(token: &str) -> Option<u8> {
    let value = token.strip_prefix('[')?.strip_suffix("%]")?;
    value.parse::<u16>().ok().map(|v| v.min(100) as u8)
}

#[cfg(test)]
mod tests {
    use super::*;

    const STEREO: &str = "Simple mixer control 'Master',0
  Capabilities: pvolume pswitch pswitch-joined
  Playback channels: Front Left - Front Right
  Limits: Playback 0 - 65536
  Mono:
  Front Left: Playback 52428 [80%] [on]
  Front Right: Playback 26214 [40%] [on]
";

    const MONO: &str = "Simple mixer control 'PCM',0
  Capabilities: pvolume pvolume-joined pswitch pswitch-joined
  Playback channels: Mono
  Limits: Playback -10239 - 400
  Mono: Playback -2000 [77%] [-20.00dB] [on]
";

    const CAPTURE_ONLY: &str = "Simple mixer control 'Mic',0
  Capabilities: cvolume
  Capture channels: Mono
  Limits: Capture 0 - 31
  Mono: Capture 20 [65%] [on]
";

    #[test]
    fn test_parse_stereo() {
        assert_eq!(parse_playback_volumes(STEREO).unwrap(), vec![80, 40]);
    }

    #[test]
    fn test_parse_mono() {
        assert_eq!(parse_playback_volumes(MONO).unwrap(), vec![77]);
    }

    #[test]
    fn test_capture_lines_are_ignored() {
        assert!(matches!(
            parse_playback_volumes(CAPTURE_ONLY),
            Err(MixerError::Parse(_))
        ));
    }

    #[test]
    fn test_empty_output() {
        assert!(parse_playback_volumes("").is_err());
    }

    #[test]
    fn test_percent_token() {
        assert_eq!(percent_token("[0%]"), Some(0));
        assert_eq!(percent_token("[100%]"), Some(100));
        assert_eq!(percent_token("[-20.00dB]"), None);
        assert_eq!(percent_token("[on]"), None);
    }
}
