#![no_main]
use libfuzzer_sys::fuzz_target;
use routeconv::{xml_to_yaml, yaml_to_xml};

fuzz_target!(|data: &[u8]| {
    if let Ok(s) = std::str::from_utf8(data) {
        if let Ok(conversion) = yaml_to_xml(s) {
            // XML we wrote must always parse
            if let Err(err) = xml_to_yaml(&conversion.output) {
                panic!("re-reading converted output failed: {err}");
            }
        }
    }
});
