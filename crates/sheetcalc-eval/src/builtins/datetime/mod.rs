//! Date and time functions over the serial-number calendar.
//! Functions implemented: DATE, TIME, YEAR, MONTH, DAY, WEEKDAY,
//! HOUR, MINUTE, SECOND, EDATE, EOMONTH

mod date_parts;
mod date_time;
mod edate_eomonth;

use sheetcalc_common::{CalcErrorKind, max_serial, min_serial};

use crate::args::{ArgSpec, ArgType};
use crate::function_registry::Registry;

/// A date serial inside the supported calendar; anything else is `#NUM!`.
fn serial_arg(name: &'static str) -> ArgSpec {
    ArgSpec::arg(
        name,
        ArgType::and([
            ArgType::Number,
            ArgType::Fails(Box::new(ArgType::Between(min_serial(), max_serial())), CalcErrorKind::Num),
        ]),
    )
}

pub(crate) fn install(reg: &Registry) {
    date_time::install(reg);
    date_parts::install(reg);
    edate_eomonth::install(reg);
}
