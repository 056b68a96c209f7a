/// Builds a structured diagnostic line with timestamp, level, component, pid,
/// tid and message.
/// Usage:
/// ```rust
/// # use eventlog_handler::diag_line;
/// let line = diag_line!("ERROR", "publish", "write failed: {}", 5);
/// assert!(line.contains("[ERROR][publish]"));
/// ```
/// Produces:
/// [2025-04-25T16:32:10+02:00][ERROR][publish][pid=4568][tid=ThreadId(1)] write failed: 5
#[macro_export]
macro_rules! diag_line {
    ($level:expr, $component:expr, $fmt:expr $(, $($arg:tt)+)?) => {
        format!(
            concat!(
                "[", "{}", "]",          // timestamp
                "[", "{}", "]",          // level via Display
                "[", "{}", "]",          // component
                "[pid=", "{}", "]",      // pid
                "[tid=", "{:?}", "] ",   // tid
                $fmt                     // your message
            ),
            $crate::__private::chrono::Local::now().to_rfc3339(),
            $level,
            $component,
            std::process::id(),
            std::thread::current().id()
            $(, $($arg)+)?
        )
    };
}
