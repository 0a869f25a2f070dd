#![no_std]
#![no_main]

// Pin map (STM32F303)
// PA0  start/stop switch, pull-up, pressed = low
// PB0  lane A IR sensor
// PB1  lane B IR sensor
// PA6  TIM3 CH1, IR emitter carrier
// PA9  USART1 TX, race results
// PA10 USART1 RX
// PB6  I2C1 SCL, 7-segment backpack
// PB7  I2C1 SDA
// PA11/PA12 USB, debug log

use panic_abort as _;
use stm32f3xx_hal as hal;

use cortex_m::asm;
use cortex_m_rt::{entry, exception, ExceptionFrame};
use hal::{
    i2c::I2c,
    pac,
    prelude::*,
    pwm::tim3,
    serial::Serial,
    usb::{Peripheral, UsbBus},
};
use log::{error, info, warn};
use race_timer_lib::*;
use usb_device::prelude::*;
use usbd_serial::{SerialPort, USB_CLASS_CDC};

const TEXT_BAUD_RATE: u32 = 9600;
const DISPLAY_I2C_ADDRESS: u8 = 0x70;
const DISPLAY_INIT_ATTEMPTS: usize = 3;
/// Modulation of the IR emitters, the sensors only respond to this carrier
const CARRIER_FREQUENCY: u32 = 450_000;
const LOG_LEVEL: log::LevelFilter = log::LevelFilter::Debug;
const USB_RX_BUFFER_CAPACITY: usize = 64;
const USB_TX_BUFFER_CAPACITY: usize = 128;

static SYS_CLOCK: SystemClock = SystemClock::new();
static LOGGER: Logger<SerialPort<UsbBus<Peripheral>, &mut [u8], &mut [u8]>> =
    Logger::new(&SYS_CLOCK);

#[entry]
fn main() -> ! {
    let dp = pac::Peripherals::take().expect("Failed to take pac::Peripherals");
    let cp =
        cortex_m::peripheral::Peripherals::take().expect("Failed to take cortex_m::Peripherals");

    // Setup system clock
    let mut flash = dp.FLASH.constrain();
    let mut rcc = dp.RCC.constrain();
    let clocks = rcc
        .cfgr
        .use_hse(8.mhz())
        .sysclk(48.mhz())
        .pclk1(24.mhz())
        .pclk2(24.mhz())
        .freeze(&mut flash.acr);
    assert!(clocks.usbclk_valid());

    let mut gpioa = dp.GPIOA.split(&mut rcc.ahb);
    let mut gpiob = dp.GPIOB.split(&mut rcc.ahb);

    // USB serial for the debug log.
    // Pull the D+ pin down to send a RESET condition to the USB bus.
    let mut usb_dp = gpioa
        .pa12
        .into_push_pull_output(&mut gpioa.moder, &mut gpioa.otyper);
    usb_dp.set_low().ok();
    asm::delay(clocks.sysclk().0 / 200);

    let usb_dm = gpioa.pa11.into_af14(&mut gpioa.moder, &mut gpioa.afrh);
    let usb_dp = usb_dp.into_af14(&mut gpioa.moder, &mut gpioa.afrh);

    let usb = Peripheral {
        usb: dp.USB,
        pin_dm: usb_dm,
        pin_dp: usb_dp,
    };

    let usb_rx_mem = unsafe {
        static mut USB_RX_MEM: [u8; USB_RX_BUFFER_CAPACITY] = [0; USB_RX_BUFFER_CAPACITY];
        &mut USB_RX_MEM[..]
    };
    let usb_tx_mem = unsafe {
        static mut USB_TX_MEM: [u8; USB_TX_BUFFER_CAPACITY] = [0; USB_TX_BUFFER_CAPACITY];
        &mut USB_TX_MEM[..]
    };

    let usb_bus = UsbBus::new(usb);
    // HACK: make the borrow have a static lifetime
    let usb_bus_borrow: &'static usb_device::bus::UsbBusAllocator<UsbBus<Peripheral>> =
        unsafe { core::mem::transmute::<_, _>(&usb_bus) };
    let usb_serial_port = SerialPort::new_with_store(usb_bus_borrow, usb_rx_mem, usb_tx_mem);
    let mut usb_dev = UsbDeviceBuilder::new(usb_bus_borrow, UsbVidPid(0x16c0, 0x27dd))
        .manufacturer("HamRadio")
        .product("Ship Stopwatch Debug Logger")
        .serial_number("0001")
        .device_class(USB_CLASS_CDC)
        .build();

    unsafe {
        LOGGER.attach(usb_serial_port);
        log::set_logger_racy(&LOGGER).ok();
    }
    log::set_max_level(LOG_LEVEL);

    // System clock tracking millis, interrupt driven
    SYS_CLOCK.enable_systick_interrupt(cp.SYST, clocks);

    // Give the host a moment to enumerate, logging still works without it
    let enumeration_start = SYS_CLOCK.now();
    while usb_dev.state() != UsbDeviceState::Configured
        && SYS_CLOCK.duration_since(enumeration_start) < Duration::ONE_SECOND
    {
        if let Some(port) = LOGGER.port() {
            usb_dev.poll(&mut [port]);
        }
    }

    // IR emitter carrier, free running from here on
    let carrier_pin = gpioa.pa6.into_af2(&mut gpioa.moder, &mut gpioa.afrl);
    let (carrier_channel, _, _, _) = tim3(dp.TIM3, 2, CARRIER_FREQUENCY.hz(), &clocks);
    let mut carrier = carrier_channel.output_to_pa6(carrier_pin);
    carrier.set_duty(carrier.get_max_duty() / 2);
    carrier.enable();

    // Race results text channel
    let tx = gpioa.pa9.into_af7(&mut gpioa.moder, &mut gpioa.afrh);
    let rx = gpioa.pa10.into_af7(&mut gpioa.moder, &mut gpioa.afrh);
    let serial = Serial::usart1(
        dp.USART1,
        (tx, rx),
        TEXT_BAUD_RATE.bps(),
        clocks,
        &mut rcc.apb2,
    );
    let (serial_tx, _serial_rx) = serial.split();

    // 7-segment display
    let scl = gpiob.pb6.into_af4(&mut gpiob.moder, &mut gpiob.afrl);
    let sda = gpiob.pb7.into_af4(&mut gpiob.moder, &mut gpiob.afrl);
    let i2c = I2c::new(dp.I2C1, (scl, sda), 100.khz(), clocks, &mut rcc.apb1);
    let mut display = Ht16k33::new(i2c, DISPLAY_I2C_ADDRESS);
    for attempt in 1..=DISPLAY_INIT_ATTEMPTS {
        match display.init() {
            Ok(()) => break,
            Err(e) if attempt == DISPLAY_INIT_ATTEMPTS => {
                error!("{}, continuing with text output only", e)
            }
            Err(e) => warn!("{} (attempt {})", e, attempt),
        }
    }

    let switch = gpioa
        .pa0
        .into_pull_up_input(&mut gpioa.moder, &mut gpioa.pupdr);
    let sensor_a = gpiob
        .pb0
        .into_floating_input(&mut gpiob.moder, &mut gpiob.pupdr);
    let sensor_b = gpiob
        .pb1
        .into_floating_input(&mut gpiob.moder, &mut gpiob.pupdr);
    let inputs = RaceInputs::new(switch, sensor_a, sensor_b, FinishDetector::default());

    let mut sink = ResultSink::new(Console::from(serial_tx), display);
    if let Err(e) = sink.startup() {
        error!("{}, continuing with display output only", e);
    }

    let mut controller = Controller::new(sink, &SYS_CLOCK);

    info!("Race timer initialized, sensors {:?}", SENSOR_MODE);

    loop {
        if let Some(port) = LOGGER.port() {
            usb_dev.poll(&mut [port]);
        }

        controller.update(inputs.sample());
    }
}

#[exception]
fn SysTick() {
    SYS_CLOCK.inc_from_interrupt();
}

#[exception]
fn HardFault(ef: &ExceptionFrame) -> ! {
    panic!("HardFault at {:#?}", ef);
}

#[exception]
fn DefaultHandler(irqn: i16) {
    panic!("Unhandled exception (IRQn = {})", irqn);
}
