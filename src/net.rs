use alloc::string::String;

use airlog_core::Error;
use airlog_core::feed::FeedRecord;
use airlog_core::traits::TelemetryClient;
use core::fmt::Write as _;
use embassy_executor::Spawner;
use embassy_net::dns::DnsQueryType;
use embassy_net::tcp::TcpSocket;
use embassy_net::{Config, Runner, Stack, StackResources};
use embassy_time::{Duration, Timer};
use embedded_io_async::{Read as _, Write as _};
use esp_radio::wifi::{
    ClientConfiguration, Configuration, WifiController, WifiDevice, WifiEvent,
};
use log::{info, warn};

/// Wi-Fi credentials, supplied at build time.
const WIFI_SSID: &str = match option_env!("WIFI_SSID") {
    Some(v) => v,
    None => "",
};
const WIFI_PASSWORD: &str = match option_env!("WIFI_PASSWORD") {
    Some(v) => v,
    None => "",
};

/// ThingSpeak channel write key, supplied at build time. Never hard-coded in
/// the pipeline; an empty key turns every upload into a configuration error.
pub const THINGSPEAK_API_KEY: &str = match option_env!("THINGSPEAK_API_KEY") {
    Some(v) => v,
    None => "",
};

const TELEMETRY_HOST: &str = "api.thingspeak.com";
const TELEMETRY_PORT: u16 = 80;

const RECONNECT_DELAY_SECS: u64 = 5;

// When you are okay with using a nightly compiler it's better to use https://docs.rs/static_cell/2.1.0/static_cell/macro.make_static.html
macro_rules! mk_static {
    ($t:ty,$val:expr) => {{
        static STATIC_CELL: static_cell::StaticCell<$t> = static_cell::StaticCell::new();
        #[deny(unused_attributes)]
        let x = STATIC_CELL.uninit().write(($val));
        x
    }};
}

/// Bring up Wi-Fi and the network stack, returning once DHCP has an address.
pub async fn start(
    spawner: Spawner,
    wifi: esp_hal::peripherals::WIFI<'static>,
) -> Result<Stack<'static>, Error> {
    if WIFI_SSID.is_empty() {
        return Err(Error::Config("wifi credentials are not set"));
    }

    let radio = &*mk_static!(
        esp_radio::Controller<'static>,
        esp_radio::init().map_err(|_| Error::Driver("radio init failed"))?
    );

    let (controller, interfaces) = esp_radio::wifi::new(radio, wifi, Default::default())
        .map_err(|_| Error::Driver("wifi init failed"))?;

    let mut rng = esp_hal::rng::Rng::new();
    let seed = ((rng.random() as u64) << 32) | rng.random() as u64;

    let (stack, runner) = embassy_net::new(
        interfaces.sta,
        Config::dhcpv4(Default::default()),
        mk_static!(StackResources<4>, StackResources::new()),
        seed,
    );

    spawner
        .spawn(connection_task(controller))
        .map_err(|_| Error::Driver("failed to spawn wifi task"))?;
    spawner
        .spawn(net_task(runner))
        .map_err(|_| Error::Driver("failed to spawn net task"))?;

    stack.wait_config_up().await;
    if let Some(config) = stack.config_v4() {
        info!("network up, address {}", config.address);
    }

    Ok(stack)
}

/// Keeps the station association alive; reconnects after drops.
#[embassy_executor::task]
async fn connection_task(mut controller: WifiController<'static>) {
    let client_config = Configuration::Client(ClientConfiguration {
        ssid: String::from(WIFI_SSID),
        password: String::from(WIFI_PASSWORD),
        ..Default::default()
    });

    if let Err(e) = controller.set_configuration(&client_config) {
        warn!("failed to set wifi configuration: {e:?}");
    }
    if let Err(e) = controller.start_async().await {
        warn!("failed to start wifi: {e:?}");
    }

    loop {
        match controller.connect_async().await {
            Ok(()) => {
                info!("wifi connected to {WIFI_SSID}");
                controller.wait_for_event(WifiEvent::StaDisconnected).await;
                warn!("wifi disconnected, reconnecting");
            }
            Err(e) => {
                warn!("wifi connect failed: {e:?}");
                Timer::after(Duration::from_secs(RECONNECT_DELAY_SECS)).await;
            }
        }
    }
}

#[embassy_executor::task]
async fn net_task(mut runner: Runner<'static, WifiDevice<'static>>) -> ! {
    runner.run().await
}

/// ThingSpeak feed endpoint.
///
/// One HTTP request per upload, nothing queued or retried locally; a failed
/// update's data is gone and the next fire sends the then-current snapshot.
pub struct ThingSpeakClient {
    stack: Stack<'static>,
}

impl ThingSpeakClient {
    pub fn new(stack: Stack<'static>) -> Self {
        Self { stack }
    }
}

impl TelemetryClient for ThingSpeakClient {
    async fn update_feed(&mut self, api_key: &str, feed: &FeedRecord) -> Result<(), Error> {
        if api_key.is_empty() {
            return Err(Error::Config("telemetry write key is not set"));
        }

        let addresses = self
            .stack
            .dns_query(TELEMETRY_HOST, DnsQueryType::A)
            .await
            .map_err(|_| Error::Network("telemetry host lookup failed"))?;
        let address = *addresses
            .first()
            .ok_or(Error::Network("telemetry host has no address"))?;

        let mut rx_buffer = [0u8; 1024];
        let mut tx_buffer = [0u8; 1024];
        let mut socket = TcpSocket::new(self.stack, &mut rx_buffer, &mut tx_buffer);
        socket
            .connect((address, TELEMETRY_PORT))
            .await
            .map_err(|_| Error::Network("telemetry connect failed"))?;

        let mut request: heapless::String<512> = heapless::String::new();
        write!(
            &mut request,
            "GET /update?api_key={}&field1={}&field2={}&field3={}&field4={} HTTP/1.1\r\n\
             Host: {}\r\n\
             Connection: close\r\n\
             \r\n",
            api_key, feed.field1, feed.field2, feed.field3, feed.field4, TELEMETRY_HOST,
        )
        .map_err(|_| Error::Network("feed request does not fit the buffer"))?;

        socket
            .write_all(request.as_bytes())
            .await
            .map_err(|_| Error::Network("telemetry send failed"))?;

        let mut response = [0u8; 128];
        let n = socket
            .read(&mut response)
            .await
            .map_err(|_| Error::Network("telemetry response read failed"))?;
        if n == 0 {
            return Err(Error::Network("telemetry endpoint closed the connection"));
        }
        if !response[..n].starts_with(b"HTTP/1.1 200") {
            return Err(Error::Network("telemetry endpoint rejected the update"));
        }

        socket.close();
        Ok(())
    }
}
