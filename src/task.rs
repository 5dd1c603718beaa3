//! Async polling loop from shared calibration to a note queue.
//!
//! [`fingering_task`] wakes at the configured poll rate, copies the
//! [`SharedCalibrator`] state, runs it through a [`Whistle`] and pushes
//! every changed note into a bounded [`Channel`].
//!
//! [`Channel`]: embassy_sync::channel::Channel

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Sender;
use embassy_time::{Duration, Timer};

use crate::config::InstrumentConfig;
use crate::instrument::Whistle;
use crate::shared::SharedCalibrator;

/// Periodic fingering loop.
///
/// This is a regular `async fn`, not an Embassy `#[task]`. Embassy tasks
/// cannot be generic, so callers wrap it in a concrete task:
///
/// ```ignore
/// static CALIBRATION: SharedCalibrator<8> = SharedCalibrator::new();
/// static NOTES: Channel<CriticalSectionRawMutex, u8, 4> = Channel::new();
///
/// #[embassy_executor::task]
/// async fn whistle_task(whistle: Whistle<8>, config: InstrumentConfig) {
///     fingering_task(&CALIBRATION, whistle, NOTES.sender(), config).await;
/// }
/// ```
///
/// # Control flow
///
/// 1. Apply the smoothing exponent from `config` to `calibration`. An
///    invalid exponent logs an error and **returns** (task exits).
/// 2. Every `config.poll_period_us()`, run [`poll_once`].
#[allow(clippy::needless_pass_by_value)] // config is small and consumed
pub async fn fingering_task<const N: usize, const Q: usize>(
    calibration: &'static SharedCalibrator<N>,
    mut whistle: Whistle<N>,
    notes: Sender<'static, CriticalSectionRawMutex, u8, Q>,
    config: InstrumentConfig,
) {
    if let Err(_e) = calibration.configure(&config) {
        #[cfg(feature = "defmt")]
        defmt::error!("fingering task config rejected: {}", _e);
        return;
    }

    let period = Duration::from_micros(config.poll_period_us());

    #[cfg(feature = "defmt")]
    defmt::info!("fingering task started, {} pads every {} us", N, config.poll_period_us());

    loop {
        Timer::after(period).await;
        poll_once(calibration, &mut whistle, &notes).await;
    }
}

/// One poll cycle.
///
/// 1. Take a snapshot of `calibration` (one short critical section).
/// 2. Update `whistle` from the snapshot, outside the lock.
/// 3. If the note changed, send it, waiting while the queue is full.
///
/// Returns the note that was sent, if any.
pub async fn poll_once<const N: usize, const Q: usize>(
    calibration: &SharedCalibrator<N>,
    whistle: &mut Whistle<N>,
    notes: &Sender<'_, CriticalSectionRawMutex, u8, Q>,
) -> Option<u8> {
    let snapshot = calibration.snapshot();
    let note = whistle.update(&snapshot)?;
    notes.send(note).await;
    Some(note)
}
