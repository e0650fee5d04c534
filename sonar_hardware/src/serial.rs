use stm32f4xx_hal::{pac::USART1, serial::Tx};

/// PA9 at 115200 baud, also the serial logger's sink.
pub type DebugSerialPort = Tx<USART1>;
