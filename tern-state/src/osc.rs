use log::debug;

use crate::screen::{Property, Screen};

/// Dispatch an Operating System Command payload.
///
/// The payload is `code;argument`; only the title/icon family is
/// interpreted, everything else is reported and dropped.
pub(crate) fn perform<S: Screen>(screen: &mut S, payload: &[u8]) {
    let (code, argument) = match payload.iter().position(|&b| b == b';') {
        Some(split) => (&payload[..split], &payload[split + 1..]),
        None => (payload, &[][..]),
    };

    match code {
        b"0" => {
            let text = String::from_utf8_lossy(argument);
            screen.set_property(Property::Title(&text));
            screen.set_property(Property::IconName(&text));
        },
        b"1" => {
            let text = String::from_utf8_lossy(argument);
            screen.set_property(Property::IconName(&text));
        },
        b"2" => {
            let text = String::from_utf8_lossy(argument);
            screen.set_property(Property::Title(&text));
        },
        _ => debug!("unhandled OSC {:?}", String::from_utf8_lossy(code)),
    }
}
