//! Agile Display Firmware - ESP32-S3 Octopus Agile price display
//!
//! Environment variables required at build time (or in secrets.local.rs):
//! - WIFI_SSID: WiFi network name
//! - WIFI_PASS: WiFi password

#![no_std]
#![no_main]

extern crate alloc;

use core::net::Ipv4Addr;

use agile_display_firmware::app::App;
use agile_display_firmware::clock::SyncedClock;
use agile_display_firmware::config::{Credentials, NTP_SERVER};
use agile_display_firmware::framebuffer::Framebuffer;
use agile_display_firmware::http::OctopusClient;
use agile_display_firmware::layout;
use agile_display_firmware::lcd::St7789;
use agile_display_firmware::network::{self, WifiLink};
use agile_display_firmware::sntp;
use embassy_executor::Spawner;
use embassy_net::{
    Runner, Stack, StackResources,
    dns::DnsSocket,
    tcp::client::{TcpClient, TcpClientState},
};
use embassy_time::Delay;
use embedded_hal_bus::spi::ExclusiveDevice;
use esp_alloc as _;
use esp_backtrace as _;
use esp_hal::{
    clock::CpuClock,
    gpio::{Level, Output, OutputConfig},
    ram,
    rng::Rng,
    spi::{
        Mode,
        master::{Config as SpiConfig, Spi},
    },
    time::Rate,
    timer::timg::TimerGroup,
};
use esp_println::println;
use esp_radio::{
    Controller,
    wifi::{ClientConfig, Config as WifiConfig, ModeConfig, WifiController, WifiDevice, WifiError},
};

esp_bootloader_esp_idf::esp_app_desc!();

// When you are okay with using a nightly compiler it's better to use https://docs.rs/static_cell/2.1.0/static_cell/macro.make_static.html
macro_rules! mk_static {
    ($t:ty,$val:expr) => {{
        static STATIC_CELL: static_cell::StaticCell<$t> = static_cell::StaticCell::new();
        #[deny(unused_attributes)]
        let x = STATIC_CELL.uninit().write(($val));
        x
    }};
}

// Missing values are rejected at startup rather than at build time
const SSID: &str = match option_env!("WIFI_SSID") {
    Some(ssid) => ssid,
    None => "",
};
const PASSWORD: &str = match option_env!("WIFI_PASS") {
    Some(password) => password,
    None => "",
};

/// TCP socket buffers for the HTTPS client
const TCP_BUF_SIZE: usize = 4096;

/// Station interface over esp-radio and the embassy-net stack
struct Station {
    controller: WifiController<'static>,
    stack: Stack<'static>,
}

impl WifiLink for Station {
    type Error = WifiError;

    async fn begin(&mut self, credentials: &Credentials<'_>) -> Result<(), WifiError> {
        let client_config = ModeConfig::Client(
            ClientConfig::default()
                .with_ssid(credentials.ssid().into())
                .with_password(credentials.password().into()),
        );
        self.controller.set_config(&client_config)?;
        println!("Starting WiFi...");
        self.controller.start_async().await?;
        println!("Connecting to {}...", credentials.ssid());
        self.controller.connect_async().await
    }

    async fn is_connected(&mut self) -> bool {
        matches!(self.controller.is_connected(), Ok(true))
            && self.stack.is_link_up()
            && self.stack.config_v4().is_some()
    }

    fn local_address(&self) -> Option<Ipv4Addr> {
        self.stack.config_v4().map(|config| config.address.address())
    }
}

#[esp_rtos::main]
async fn main(spawner: Spawner) -> ! {
    // Init logger first so we can see any early crashes
    esp_println::logger::init_logger_from_env();

    let config = esp_hal::Config::default().with_cpu_clock(CpuClock::max());
    let peripherals = esp_hal::init(config);

    println!("Boot!");

    // Internal RAM for small allocations, PSRAM for the framebuffer
    println!("Initializing heap...");
    esp_alloc::heap_allocator!(#[ram(reclaimed)] size: 64 * 1024);
    esp_alloc::heap_allocator!(size: 36 * 1024);
    esp_alloc::psram_allocator!(&peripherals.PSRAM, esp_hal::psram);

    println!("Starting RTOS...");
    let timg0 = TimerGroup::new(peripherals.TIMG0);
    esp_rtos::start(
        timg0.timer0,
        #[cfg(target_arch = "riscv32")]
        esp_hal::interrupt::software::SoftwareInterruptControl::new(peripherals.SW_INTERRUPT)
            .software_interrupt0,
    );
    println!("RTOS started");

    // ==================== WiFi ====================
    let rng = Rng::new();

    println!("Initializing WiFi...");
    let ctrl = mk_static!(
        Controller<'static>,
        esp_radio::init().expect("Radio init failed")
    );
    let (controller, ifaces) = esp_radio::wifi::new(ctrl, peripherals.WIFI, WifiConfig::default())
        .expect("WiFi init failed");

    let net_config = embassy_net::Config::dhcpv4(Default::default());
    let (stack, runner) = embassy_net::new(
        ifaces.sta,
        net_config,
        mk_static!(StackResources<3>, StackResources::<3>::new()),
        rng.random() as u64,
    );
    spawner.spawn(net_task(runner)).ok();

    let mut station = Station { controller, stack };
    match network::connect(&mut station, &mut Delay, SSID, PASSWORD).await {
        Ok(address) => println!("WiFi ready! IP: {}", address),
        Err(e) => {
            println!("WiFi bootstrap failed: {}", e);
            panic!("{}", e);
        }
    }

    // ==================== Clock ====================
    println!("Syncing time with {}...", NTP_SERVER);
    let unix_now = match sntp::query(stack, NTP_SERVER).await {
        Ok(secs) => secs,
        Err(e) => panic!("Time sync failed: {:?}", e),
    };
    println!("Time synced: {}", unix_now);
    let clock = SyncedClock::new(unix_now);

    // ==================== LCD ====================
    // SCK=GPIO12, MOSI=GPIO11, CS=GPIO10, DC=GPIO9, RST=GPIO8, BL=GPIO7
    let spi = Spi::new(
        peripherals.SPI2,
        SpiConfig::default()
            .with_frequency(Rate::from_mhz(40))
            .with_mode(Mode::_0),
    )
    .expect("SPI init failed")
    .with_sck(peripherals.GPIO12)
    .with_mosi(peripherals.GPIO11);

    let cs = Output::new(peripherals.GPIO10, Level::High, OutputConfig::default());
    let spi_device = ExclusiveDevice::new_no_delay(spi, cs).expect("SPI device init failed");
    let dc = Output::new(peripherals.GPIO9, Level::Low, OutputConfig::default());
    let rst = Output::new(peripherals.GPIO8, Level::High, OutputConfig::default());
    let _backlight = Output::new(peripherals.GPIO7, Level::High, OutputConfig::default());

    println!("Initializing LCD...");
    let mut lcd = St7789::new(spi_device, dc, rst, &mut Delay).expect("LCD init failed");

    let mut framebuffer = Framebuffer::new();
    let Ok(()) = layout::draw_splash(&mut framebuffer);
    lcd.display(framebuffer.as_slice())
        .expect("LCD write failed");

    // ==================== Prices ====================
    let tcp_state = mk_static!(
        TcpClientState<1, TCP_BUF_SIZE, TCP_BUF_SIZE>,
        TcpClientState::new()
    );
    let tcp_client = TcpClient::new(stack, tcp_state);
    let dns_socket = DnsSocket::new(stack);
    let source = OctopusClient::new(&tcp_client, &dns_socket, rng.random() as u64);

    let mut app = match App::start(clock, source).await {
        Ok(app) => app,
        Err(e) => panic!("Price fetch failed: {:?}", e),
    };

    loop {
        let frame = match app.next_frame().await {
            Ok(frame) => frame,
            Err(e) => panic!("Price fetch failed: {:?}", e),
        };

        let Ok(()) = frame.draw(&mut framebuffer);
        lcd.display(framebuffer.as_slice())
            .expect("LCD write failed");

        embassy_futures::yield_now().await;
    }
}

#[embassy_executor::task]
async fn net_task(mut runner: Runner<'static, WifiDevice<'static>>) {
    runner.run().await
}
