/*
 *  meter.rs
 *
 *  LCDvu - worth the squeeze
 *	(c) 2020-26 Stuart Hunter
 *
 *	Refresh loop: welcome screen, then sample and draw until told to stop
 *
 *	This program is free software: you can redistribute it and/or modify
 *	it under the terms of the GNU General Public License as published by
 *	the Free Software Foundation, either version 3 of the License, or
 *	(at your option) any later version.
 *
 *	This program is distributed in the hope that it will be useful,
 *	but WITHOUT ANY WARRANTY; without even the implied warranty of
 *	MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 *	GNU General Public License for more details.
 *
 *	See <http://www.gnu.org/licenses/> to get a copy of the GNU General
 *	Public License.
 *
 */

use std::future::Future;
use std::time::Duration;

use log::{debug, error, info, warn};

use crate::bar::{DisplayFrame, Half};
use crate::config::MeterConfig;
use crate::constants::HALF_CELLS;
use crate::display::{BoxedDisplay, DisplayError};
use crate::glyphs::{BAR_CHARS, GlyphBitmap};
use crate::mixer::VolumeSampler;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MeterState {
    Init,
    Running,
    Terminated,
}

#[derive(Debug, Clone)]
pub struct MeterSettings {
    pub refresh: Duration,
    /// None skips the welcome screen
    pub splash: Option<Duration>,
    pub welcome: String,
    pub row: u8,
    pub backlight: bool,
    pub glyphs: [GlyphBitmap; 8],
}

impl Default for MeterSettings {
    fn default() -> Self {
        Self::from_config(&MeterConfig::default())
    }
}

impl MeterSettings {
    pub fn from_config(config: &MeterConfig) -> Self {
        Self {
            refresh: config.refresh_interval(),
            splash: config.show_splash().then(|| config.splash_duration()),
            welcome: config.welcome().to_string(),
            row: config.row(),
            backlight: true,
            glyphs: BAR_CHARS,
        }
    }

    pub fn with_backlight(mut self, on: bool) -> Self {
        self.backlight = on;
        self
    }
}

/// Owns the display and the sampler for the life of the process
pub struct Meter {
    display: BoxedDisplay,
    sampler: VolumeSampler,
    settings: MeterSettings,
    state: MeterState,
    ticks: u64,
    last_frame: Option<DisplayFrame>,
}

impl Meter {
    pub fn new(display: BoxedDisplay, sampler: VolumeSampler, settings: MeterSettings) -> Self {
        Self {
            display,
            sampler,
            settings,
            state: MeterState::Init,
            ticks: 0,
            last_frame: None,
        }
    }

    pub fn state(&self) -> MeterState {
        self.state
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn last_frame(&self) -> Option<&DisplayFrame> {
        self.last_frame.as_ref()
    }

    /// Init state: bring the controller up, load the bar glyphs and show
    /// the welcome text for the splash delay.
    pub async fn start(&mut self) -> Result<(), DisplayError> {
        self.display.init()?;
        self.display.load_glyph_set(&self.settings.glyphs)?;
        if self.display.capabilities().supports_backlight {
            if let Err(e) = self.display.set_backlight(self.settings.backlight) {
                warn!("Could not set backlight: {}", e);
            }
        }

        if let Some(delay) = self.settings.splash {
            let (cols, _) = self.display.dimensions();
            let welcome: String = self.settings.welcome.chars().take(cols as usize).collect();
            self.display.clear()?;
            self.display.set_cursor(0, 0)?;
            self.display.write_str(&welcome)?;
            self.display.flush()?;
            tokio::time::sleep(delay).await;
        }

        info!("Meter running, refresh every {:?}", self.settings.refresh);
        self.state = MeterState::Running;
        Ok(())
    }

    /// One Running iteration, without the sleep. Display errors are logged
    /// and the frame is still returned, the next tick simply tries again.
    pub fn tick(&mut self) -> DisplayFrame {
        if let Err(e) = self.blank_row() {
            error!("Failed to clear meter row: {}", e);
        }

        let reading = self.sampler.sample();
        let frame = DisplayFrame::from_reading(reading);

        if let Err(e) = self.draw(&frame) {
            error!("Failed to render meter frame: {}", e);
        }

        self.ticks += 1;
        if self.last_frame.as_ref() != Some(&frame) {
            debug!(
                "L {:>3}% -> {}  R {:>3}% -> {}",
                reading.left, frame.left_level, reading.right, frame.right_level
            );
        }
        self.last_frame = Some(frame);
        frame
    }

    fn blank_row(&mut self) -> Result<(), DisplayError> {
        self.display.set_cursor(self.settings.row, 0)?;
        self.display.write_str(&" ".repeat(HALF_CELLS * 2))
    }

    fn draw(&mut self, frame: &DisplayFrame) -> Result<(), DisplayError> {
        for half in [Half::Left, Half::Right] {
            self.display.set_cursor(self.settings.row, half.column())?;
            self.display.write_glyphs(frame.half(half))?;
        }
        self.display.flush()
    }

    /// Terminated state: blank the display on the way out
    pub fn shutdown(&mut self) {
        if let Err(e) = self.display.clear().and_then(|_| self.display.flush()) {
            error!("Failed to clear display on shutdown: {}", e);
        }
        self.state = MeterState::Terminated;
        info!("Shutdown signal received.");
    }

    /// Run Init then Running until `shutdown` resolves, then Terminate.
    /// Only a display that cannot be brought up at all is an error.
    pub async fn run<F>(&mut self, shutdown: F) -> Result<(), DisplayError>
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);

        let interrupted = tokio::select! {
            biased;
            _ = &mut shutdown => true,
            started = self.start() => {
                started?;
                false
            }
        };

        if !interrupted {
            loop {
                self.tick();
                let stop = tokio::select! {
                    biased;
                    _ = &mut shutdown => true,
                    _ = tokio::time::sleep(self.settings.refresh) => false,
                };
                if stop {
                    break;
                }
            }
        }

        self.shutdown();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::display::drivers::mock::{MockCell, MockDisplay};
    use crate::display::DisplayCapabilities;
    use crate::glyphs::BarGlyph;
    use crate::mixer::{Mixer, MixerError};
    use std::sync::{Arc, Mutex};

    struct FixedMixer(Vec<u8>);

    impl Mixer for FixedMixer {
        fn channel_volumes(&mut self) -> Result<Vec<u8>, MixerError> {
            Ok(self.0.clone())
        }
        fn describe(&self) -> String {
            "fixed".to_string()
        }
    }

    struct BrokenMixer;

    impl Mixer for BrokenMixer {
        fn channel_volumes(&mut self) -> Result<Vec<u8>, MixerError> {
            Err(MixerError::Read("EIO".to_string()))
        }
        fn describe(&self) -> String {
            "broken".to_string()
        }
    }

    fn meter_with(sampler: VolumeSampler, splash: bool) -> (Meter, MockDisplay) {
        let display = MockDisplay::new(16, 2);
        let config = MeterConfig { splash: Some(splash), ..Default::default() };
        let meter = Meter::new(Box::new(display.clone()), sampler, MeterSettings::from_config(&config));
        (meter, display)
    }

    fn row0(display: &MockDisplay) -> Vec<MockCell> {
        let state = display.state();
        let state = state.lock().unwrap();
        state.row(0).to_vec()
    }

    fn filled(cells: &[MockCell]) -> usize {
        cells.iter().filter(|c| matches!(c, MockCell::Glyph(g) if !g.is_blank())).count()
    }

    #[tokio::test(start_paused = true)]
    async fn test_start_shows_welcome_and_loads_glyphs() {
        let (mut meter, display) = meter_with(VolumeSampler::disabled(), true);
        assert_eq!(meter.state(), MeterState::Init);

        meter.start().await.unwrap();

        assert_eq!(meter.state(), MeterState::Running);
        let state = display.state();
        let state = state.lock().unwrap();
        assert_eq!(state.init_count, 1);
        assert_eq!(state.row_text(0), "LCD1602 VU Meter");
        assert_eq!(state.glyphs_loaded[7], Some(BAR_CHARS[7]));
        assert_eq!(state.backlight, Some(true));
    }

    #[tokio::test(start_paused = true)]
    async fn test_backlight_left_alone_without_control() {
        let display = MockDisplay::with_capabilities(DisplayCapabilities {
            cols: 16,
            rows: 2,
            custom_glyphs: 8,
            supports_backlight: false,
        });
        let config = MeterConfig { splash: Some(false), ..Default::default() };
        let mut meter = Meter::new(
            Box::new(display.clone()),
            VolumeSampler::disabled(),
            MeterSettings::from_config(&config),
        );

        meter.start().await.unwrap();
        assert_eq!(meter.state(), MeterState::Running);
        assert_eq!(display.state().lock().unwrap().backlight, None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_splash_waits_one_second() {
        let (mut meter, _display) = meter_with(VolumeSampler::disabled(), true);
        let before = tokio::time::Instant::now();
        meter.start().await.unwrap();
        assert!(before.elapsed() >= Duration::from_secs(1));
    }

    #[test]
    fn test_tick_draws_both_halves() {
        let sampler = VolumeSampler::new(Box::new(FixedMixer(vec![50, 100])));
        let (mut meter, display) = meter_with(sampler, false);

        let frame = meter.tick();
        assert_eq!((frame.left_level, frame.right_level), (3, 7));

        let cells = row0(&display);
        assert_eq!(filled(&cells[..8]), 3);
        assert_eq!(filled(&cells[8..]), 7);
        assert_eq!(cells[0], MockCell::Glyph(BarGlyph::Level3));
        assert_eq!(cells[3], MockCell::Glyph(BarGlyph::Blank));
        assert_eq!(cells[14], MockCell::Glyph(BarGlyph::Full));
        assert_eq!(cells[15], MockCell::Glyph(BarGlyph::Blank));
        assert_eq!(meter.ticks(), 1);
    }

    #[test]
    fn test_tick_overwrites_previous_frame() {
        let volumes = Arc::new(Mutex::new(vec![100u8, 100]));

        struct SharedMixer(Arc<Mutex<Vec<u8>>>);
        impl Mixer for SharedMixer {
            fn channel_volumes(&mut self) -> Result<Vec<u8>, MixerError> {
                Ok(self.0.lock().unwrap().clone())
            }
            fn describe(&self) -> String {
                "shared".to_string()
            }
        }

        let sampler = VolumeSampler::new(Box::new(SharedMixer(Arc::clone(&volumes))));
        let (mut meter, display) = meter_with(sampler, false);

        meter.tick();
        assert_eq!(filled(&row0(&display)), 14);

        *volumes.lock().unwrap() = vec![20, 0];
        meter.tick();
        let cells = row0(&display);
        assert_eq!(filled(&cells), 1);
        assert_eq!(cells[0], MockCell::Glyph(BarGlyph::Level1));
    }

    #[test]
    fn test_failed_mixer_renders_blank() {
        let sampler = VolumeSampler::new(Box::new(BrokenMixer));
        let (mut meter, display) = meter_with(sampler, false);

        for _ in 0..3 {
            assert!(meter.tick().is_blank());
        }
        let cells = row0(&display);
        assert!(cells.iter().all(|c| *c == MockCell::Glyph(BarGlyph::Blank)));
    }

    #[test]
    fn test_display_failure_does_not_stop_ticks() {
        let sampler = VolumeSampler::new(Box::new(FixedMixer(vec![100])));
        let (mut meter, display) = meter_with(sampler, false);
        display.state().lock().unwrap().simulate_write_failure = true;

        let frame = meter.tick();
        assert_eq!(frame.left_level, 7);
        meter.tick();
        assert_eq!(meter.ticks(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_until_shutdown() {
        let sampler = VolumeSampler::new(Box::new(FixedMixer(vec![100, 100])));
        let (mut meter, display) = meter_with(sampler, false);

        meter
            .run(tokio::time::sleep(Duration::from_millis(350)))
            .await
            .unwrap();

        assert_eq!(meter.state(), MeterState::Terminated);
        assert!(meter.ticks() >= 3 && meter.ticks() <= 4, "ticks {}", meter.ticks());
        assert!(meter.last_frame().is_some_and(|f| f.filled(Half::Left) == 7));

        // shutdown clears what the last tick drew
        let state = display.state();
        let state = state.lock().unwrap();
        assert!(state.clear_count >= 1);
        assert_eq!(state.row_text(0).trim(), "");
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_during_splash() {
        let (mut meter, display) = meter_with(VolumeSampler::disabled(), true);

        meter
            .run(tokio::time::sleep(Duration::from_millis(200)))
            .await
            .unwrap();

        assert_eq!(meter.state(), MeterState::Terminated);
        assert_eq!(meter.ticks(), 0);
        assert_eq!(display.state().lock().unwrap().row_text(0).trim(), "");
    }

    #[tokio::test]
    async fn test_init_failure_propagates() {
        let (mut meter, display) = meter_with(VolumeSampler::disabled(), false);
        display.state().lock().unwrap().simulate_init_failure = true;

        let result = meter.run(std::future::pending::<()>()).await;
        assert!(matches!(result, Err(DisplayError::InitializationFailed(_))));
    }
}
