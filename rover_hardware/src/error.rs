use thiserror::Error;

#[derive(Debug, Error)]
pub enum HwError {
    #[error("gpio error: {0}")]
    Gpio(String),
    #[error("pwm error: {0}")]
    Pwm(String),
    #[error("hc-sr04 echo timeout")]
    EchoTimeout,
    #[error("serial error: {0}")]
    Serial(String),
    #[error("no usable serial port (tried {0})")]
    NoSerialPort(String),
}

pub type Result<T> = std::result::Result<T, HwError>;
