//! # 错误处理宏

/// 快速创建参数错误的宏
#[macro_export]
macro_rules! argument_error {
    ($msg:expr) => {
        $crate::error::CacheError::argument($msg)
    };
    ($fmt:expr, $($arg:tt)*) => {
        $crate::error::CacheError::argument(format!($fmt, $($arg)*))
    };
}

/// 快速创建缓存系统错误的宏
#[macro_export]
macro_rules! system_error {
    ($msg:expr) => {
        $crate::error::CacheError::system($msg)
    };
    ($fmt:expr, $($arg:tt)*) => {
        $crate::error::CacheError::system(format!($fmt, $($arg)*))
    };
}

/// 确保条件成立，否则返回参数错误
#[macro_export]
macro_rules! ensure_argument {
    ($cond:expr, $msg:expr) => {
        if !($cond) {
            return Err($crate::argument_error!($msg));
        }
    };
    ($cond:expr, $fmt:expr, $($arg:tt)*) => {
        if !($cond) {
            return Err($crate::argument_error!($fmt, $($arg)*));
        }
    };
}
