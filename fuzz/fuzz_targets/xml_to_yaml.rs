#![no_main]
use libfuzzer_sys::fuzz_target;
use routeconv::{xml_to_yaml, yaml_to_xml};

fuzz_target!(|data: &[u8]| {
    if let Ok(s) = std::str::from_utf8(data) {
        if let Ok(conversion) = xml_to_yaml(s) {
            // YAML we wrote must always read back
            if let Err(err) = yaml_to_xml(&conversion.output) {
                panic!("re-reading converted output failed: {err}");
            }
        }
    }
});
