#![no_std]
#![no_main]

use core::cell::RefCell;

use embassy_executor::Spawner;
use embassy_sync::blocking_mutex::Mutex;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_time::{Instant, Timer};
use esp_backtrace as _;
use esp_hal::timer::timg::TimerGroup;
use log::{error, info, warn};

use airlog::hardware::{Ads1115Hardware, Bme280Hardware};
use airlog::net::{self, ThingSpeakClient};
use airlog_core::adc::AdcSettings;
use airlog_core::lifecycle::Lifecycle;
use airlog_core::schedule::PeriodicTask;
use airlog_core::traits::{Co2Adc, EnvironmentSensor};
use airlog_core::{ReadingsStore, pipeline};

esp_bootloader_esp_idf::esp_app_desc!();

/// Latest reading of each measured quantity, shared by the sampling tasks
/// (writers) and the uploader (reader).
static READINGS: ReadingsStore = ReadingsStore::new();

/// Lifecycle controller owning the three periodic-task schedules.
static LIFECYCLE: Mutex<CriticalSectionRawMutex, RefCell<Lifecycle>> =
    Mutex::new(RefCell::new(Lifecycle::new()));

fn with_lifecycle<R>(f: impl FnOnce(&mut Lifecycle) -> R) -> R {
    LIFECYCLE.lock(|lc| f(&mut lc.borrow_mut()))
}

/// Sleep until the selected schedule's next fire and claim it. Returns false
/// once the schedule is stopped; the calling task then exits and never fires
/// again. A wake that finds the schedule re-anchored but still running goes
/// back to sleep until the new due time.
async fn pace(select: fn(&mut Lifecycle) -> &mut PeriodicTask) -> bool {
    loop {
        let Some(due) = with_lifecycle(|lc| select(lc).next_fire()) else {
            return false;
        };
        Timer::at(due).await;
        if with_lifecycle(|lc| select(lc).try_fire(Instant::now())) {
            return true;
        }
    }
}

#[embassy_executor::task]
async fn co2_sample_task(mut adc: Ads1115Hardware<'static>) {
    while pace(Lifecycle::co2_task_mut).await {
        match pipeline::sample_co2(&mut adc, &READINGS) {
            Ok(sample) => info!("CO2: {:.1} ppm ({:.3} V)", sample.ppm, sample.voltage),
            Err(e) => warn!("CO2 sample skipped: {e}"),
        }
    }
    info!("CO2 sampling stopped");
}

#[embassy_executor::task]
async fn environment_sample_task(mut sensor: Bme280Hardware<'static>) {
    while pace(Lifecycle::environment_task_mut).await {
        if let Err(e) = pipeline::sample_environment(&mut sensor, &READINGS).await {
            warn!("environment sample skipped: {e}");
        }
    }
    info!("environment sampling stopped");
}

#[embassy_executor::task]
async fn upload_task(mut client: ThingSpeakClient) {
    while pace(Lifecycle::upload_task_mut).await {
        match pipeline::upload_snapshot(&mut client, &READINGS, net::THINGSPEAK_API_KEY).await {
            Ok(_) => info!("telemetry feed updated"),
            Err(e) => warn!("sending data has failed: {e}"),
        }
    }
    info!("telemetry upload stopped");
}

/// Brings the network up on its own schedule so a missing access point never
/// delays sensor initialization. The uploader is spawned only once DHCP has
/// an address; its schedule runs from activation either way.
#[embassy_executor::task]
async fn network_task(spawner: Spawner, wifi: esp_hal::peripherals::WIFI<'static>) {
    match net::start(spawner, wifi).await {
        Ok(stack) => {
            if let Err(e) = spawner.spawn(upload_task(ThingSpeakClient::new(stack))) {
                error!("failed to spawn upload task: {e:?}");
            }
        }
        Err(e) => error!("network bring-up failed: {e}"),
    }
}

#[esp_rtos::main]
async fn main(spawner: Spawner) {
    esp_println::logger::init_logger_from_env();
    let peripherals = esp_hal::init(esp_hal::Config::default());
    esp_alloc::heap_allocator!(size: 96 * 1024);

    // Initialize RTOS timer for embassy
    let timg0 = TimerGroup::new(peripherals.TIMG0);
    esp_rtos::start(timg0.timer0);

    esp_println::println!("=== airlog ===");

    // Activation: the upload schedule starts right away; its early fires may
    // carry empty field values while the sensors are still initializing.
    with_lifecycle(|lc| lc.activate(Instant::now()));

    if let Err(e) = spawner.spawn(network_task(spawner, peripherals.WIFI)) {
        error!("failed to spawn network task: {e:?}");
    }

    // ADS1115 on I2C0: configure once, then the continuous-read handshake
    // gates the CO2 sampling schedule.
    let mut adc = Ads1115Hardware::new(
        peripherals.I2C0,
        peripherals.GPIO8,
        peripherals.GPIO9,
        AdcSettings::station_default(),
    );
    match adc.start_continuous().await {
        Ok(()) => {
            with_lifecycle(|lc| lc.co2_sensor_ready(Instant::now()));
            if let Err(e) = spawner.spawn(co2_sample_task(adc)) {
                error!("failed to spawn CO2 task: {e:?}");
            }
        }
        Err(e) => error!("ADC initialization has failed: {e}"),
    }

    // BME280 on I2C1; its readiness is independent of the ADC's.
    let mut sensor = Bme280Hardware::new(peripherals.I2C1, peripherals.GPIO2, peripherals.GPIO1);
    match sensor.initialize().await {
        Ok(()) => {
            with_lifecycle(|lc| lc.environment_ready(Instant::now()));
            if let Err(e) = spawner.spawn(environment_sample_task(sensor)) {
                error!("failed to spawn environment task: {e:?}");
            }
        }
        Err(e) => error!("environmental sensor initialization has failed: {e}"),
    }
}
