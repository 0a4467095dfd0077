#![no_std]
#![no_main]

use defmt::{debug, info, warn};
use defmt_rtt as _;
use embassy_executor::Spawner;
use embassy_rp::bind_interrupts;
use embassy_rp::gpio::{Level, Output};
use embassy_rp::peripherals::UART1;
use embassy_rp::uart::{Config as UartConfig, Uart};
use embassy_time::{Duration, Instant, Ticker};
use heater_core::proto::{NumericField, TextField, BAUDRATE};
use heater_telemetry::{
    new_rx_queue, DefmtSink, HeaterConfig, LedSink, QueueSource, RxQueue, SinkBindings,
    TickOutcome, UartReceiver, UpdateScheduler,
};
use static_cell::StaticCell;

#[cfg(feature = "dev-panic")]
use panic_probe as _;
#[cfg(feature = "prod-panic")]
use panic_reset as _;

bind_interrupts!(struct Irqs {
    UART1_IRQ => embassy_rp::uart::InterruptHandler<UART1>;
});

/// How often buffered bytes are drained (ms).
///
/// Well below the frame timeout so byte timestamps stay meaningful.
const POLL_INTERVAL_MS: u64 = 20;

#[cfg(not(feature = "publish-on-change"))]
const CONFIG: HeaterConfig = HeaterConfig::DEFAULT;
#[cfg(feature = "publish-on-change")]
const CONFIG: HeaterConfig =
    HeaterConfig::DEFAULT.with_publish_mode(heater_core::PublishMode::OnChange { deadband: 0.1 });

/// Bytes received from the bus, waiting for the scheduler.
static RX_QUEUE: RxQueue = new_rx_queue();

static NUMERIC_SINKS: StaticCell<[DefmtSink; NumericField::COUNT]> = StaticCell::new();
static TEXT_SINKS: StaticCell<[DefmtSink; TextField::COUNT]> = StaticCell::new();
static LED_SINK: StaticCell<LedSink<'static>> = StaticCell::new();

#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("Heater telemetry starting...");

    let p = embassy_rp::init(embassy_rp::config::Config::default());

    // --- UART Setup ---
    let mut uart_config = UartConfig::default();
    uart_config.baudrate = BAUDRATE;

    let uart = Uart::new(
        p.UART1,
        p.PIN_8, // TX
        p.PIN_9, // RX
        Irqs,
        p.DMA_CH0,
        p.DMA_CH1,
        uart_config,
    );
    let (_tx, rx) = uart.split();
    let receiver = UartReceiver::new(rx, &RX_QUEUE);

    // --- Sinks ---
    let numeric = NUMERIC_SINKS.init(NumericField::ALL.map(DefmtSink::numeric));
    let text = TEXT_SINKS.init(TextField::ALL.map(DefmtSink::text));
    let led = LED_SINK.init(LedSink::new(Output::new(p.PIN_25, Level::Low)));

    let mut builder = SinkBindings::builder();
    for (field, sink) in NumericField::ALL.into_iter().zip(numeric) {
        builder = builder.numeric(field, sink);
    }
    for (field, sink) in TextField::ALL.into_iter().zip(text) {
        builder = builder.text(field, sink);
    }
    let sinks = builder
        .binary(heater_core::proto::BinaryField::OnOffState, led)
        .build();

    let scheduler = match UpdateScheduler::new(QueueSource::new(&RX_QUEUE), sinks, CONFIG) {
        Ok(scheduler) => scheduler,
        Err(e) => defmt::panic!("Invalid configuration: {}", e),
    };

    // Spawn tasks (unwrap the SpawnToken, then spawn)
    spawner.spawn(uart_task(receiver).unwrap());
    spawner.spawn(telemetry_task(scheduler).unwrap());

    info!("Heater telemetry initialized, listening at {} baud...", BAUDRATE);
}

/// UART task - moves received bytes into the shared queue.
#[embassy_executor::task]
async fn uart_task(mut receiver: UartReceiver<'static>) {
    receiver.run().await
}

/// Telemetry task - polls the queue and publishes on the update interval.
#[embassy_executor::task]
async fn telemetry_task(mut scheduler: UpdateScheduler<'static, QueueSource>) {
    let interval = u64::from(scheduler.config().update_interval_ms);
    let mut ticker = Ticker::every(Duration::from_millis(POLL_INTERVAL_MS));
    let mut next_publish = Instant::now().as_millis() + interval;

    loop {
        ticker.next().await;
        let now = Instant::now().as_millis();

        if now < next_publish {
            scheduler.poll(now);
            continue;
        }
        next_publish = now + interval;

        match scheduler.tick(now) {
            TickOutcome::Published(report) => {
                debug!("Published: {:?}", report);
            }
            TickOutcome::Stale => {
                warn!("No valid frame this interval, keeping previous values");
            }
            TickOutcome::NoSnapshot => {
                warn!("No valid frame received yet");
            }
        }
        debug!(
            "Stats: {:?}, noise bytes: {}, queue drops: {}",
            scheduler.stats(),
            scheduler.discarded_bytes(),
            scheduler.reader().dropped()
        );
    }
}
