//! Interface table and detail extraction.
//!
//! Both parsers are best-effort scrapers over IOS-style text. Rows or fields
//! that do not match are dropped, never reported as errors. The brief-table
//! pattern assumes one interface per line; interface names long enough to
//! wrap onto a second line are not recovered.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

/// One network interface as extracted from device output.
///
/// Which fields are present depends on the extraction that produced it.
/// Fields missing from the text are `None` and omitted when serialized.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct InterfaceRecord {
    pub name: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub ip_address: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub ok: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub protocol: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub mac_address: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub mtu: Option<u32>,

    /// Bandwidth in kilobits per second.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bandwidth: Option<u64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub packets_input: Option<u64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub packets_output: Option<u64>,
}

impl InterfaceRecord {
    /// A record carrying only the interface name.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }
}

// Interface  IP-Address  OK?  Method  Status  Protocol
static BRIEF_ROW: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\S+)\s+(\S+)\s+(\S+)\s+(\S+)\s+(administratively down|\S+)\s+(\S+)$")
        .expect("valid brief row regex")
});

static STATUS_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?m)^\S+ is ([\w ]+?), line protocol is (\w+)").expect("valid status regex")
});
static MAC: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"Hardware.+address is (\S+)").expect("valid mac regex"));
static INTERNET: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"Internet address is (\S+)").expect("valid address regex"));
static MTU: Lazy<Regex> = Lazy::new(|| Regex::new(r"MTU (\d+) bytes").expect("valid mtu regex"));
static BANDWIDTH: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"BW (\d+) Kbit").expect("valid bandwidth regex"));
static DESCRIPTION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"Description: (.+)").expect("valid description regex"));
static PACKETS_IN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\d+) packets input").expect("valid input regex"));
static PACKETS_OUT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\d+) packets output").expect("valid output regex"));

/// Parse `show ip interface brief` output.
///
/// The header row is skipped, as is every line that does not split into
/// exactly six columns (the command echo, the prompt, wrapped lines).
pub fn parse_interface_brief(text: &str) -> Vec<InterfaceRecord> {
    text.lines()
        .filter_map(|line| BRIEF_ROW.captures(line.trim()))
        .filter(|caps| &caps[1] != "Interface")
        .map(|caps| InterfaceRecord {
            name: caps[1].to_string(),
            ip_address: Some(&caps[2])
                .filter(|ip| !ip.eq_ignore_ascii_case("unassigned"))
                .map(str::to_string),
            ok: Some(caps[3].to_string()),
            method: Some(caps[4].to_string()),
            status: Some(caps[5].to_string()),
            protocol: Some(caps[6].to_string()),
            ..Default::default()
        })
        .collect()
}

/// Parse `show interfaces <name>` output into a record for `name`.
///
/// Each field has its own pattern and is set only when that pattern
/// matches; numeric fields that fail to parse are left out.
pub fn parse_interface_detail(name: &str, text: &str) -> InterfaceRecord {
    let mut record = InterfaceRecord::named(name);

    if let Some(caps) = STATUS_LINE.captures(text) {
        record.status = Some(caps[1].trim().to_string());
        record.protocol = Some(caps[2].to_string());
    }
    record.mac_address = capture(&MAC, text);
    record.ip_address = capture(&INTERNET, text);
    record.mtu = capture(&MTU, text).and_then(|v| v.parse().ok());
    record.bandwidth = capture(&BANDWIDTH, text).and_then(|v| v.parse().ok());
    record.description = capture(&DESCRIPTION, text)
        .map(|d| d.trim().to_string())
        .filter(|d| !d.is_empty());
    record.packets_input = capture(&PACKETS_IN, text).and_then(|v| v.parse().ok());
    record.packets_output = capture(&PACKETS_OUT, text).and_then(|v| v.parse().ok());

    record
}

fn capture(pattern: &Regex, text: &str) -> Option<String> {
    pattern.captures(text).map(|caps| caps[1].to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str = "Interface              IP-Address      OK? Method Status                Protocol";

    #[test]
    fn test_single_row() {
        let text = format!("{HEADER}\nGigabitEthernet0/0  10.0.0.1  YES  manual  up  up\n");
        let records = parse_interface_brief(&text);
        assert_eq!(
            records,
            vec![InterfaceRecord {
                name: "GigabitEthernet0/0".to_string(),
                ip_address: Some("10.0.0.1".to_string()),
                ok: Some("YES".to_string()),
                method: Some("manual".to_string()),
                status: Some("up".to_string()),
                protocol: Some("up".to_string()),
                ..Default::default()
            }]
        );
    }

    #[test]
    fn test_counts_rows_and_skips_header() {
        let text = format!(
            "show ip interface brief\r\n{HEADER}\r\n\
             GigabitEthernet1       10.10.20.48     YES NVRAM  up                    up\r\n\
             GigabitEthernet2       unassigned      YES NVRAM  administratively down down\r\n\
             Loopback0              192.0.2.1       YES manual up                    up\r\n\
             Router#"
        );
        let records = parse_interface_brief(&text);
        assert_eq!(records.len(), 3);
        assert_eq!(records[1].name, "GigabitEthernet2");
        assert_eq!(records[1].ip_address, None);
        assert_eq!(records[1].status.as_deref(), Some("administratively down"));
        assert_eq!(records[2].name, "Loopback0");
    }

    #[test]
    fn test_malformed_rows_are_skipped() {
        let text = format!(
            "{HEADER}\n\
             GigabitEthernet0/0  10.0.0.1  YES  manual  up  up\n\
             GigabitEthernet0/1  10.0.0.2  YES  manual  up\n\
             garbage\n\
             GigabitEthernet0/2  10.0.0.3  YES  manual  up  up  extra  columns\n\
             GigabitEthernet0/3  10.0.0.4  YES  DHCP  down  down\n"
        );
        let records = parse_interface_brief(&text);
        let names: Vec<_> = records.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["GigabitEthernet0/0", "GigabitEthernet0/3"]);
    }

    #[test]
    fn test_empty_text() {
        assert!(parse_interface_brief("").is_empty());
        assert_eq!(parse_interface_detail("Gi0/0", ""), InterfaceRecord::named("Gi0/0"));
    }

    const DETAIL: &str = "\
GigabitEthernet1 is up, line protocol is up
  Hardware is CSR vNIC, address is 0050.56bb.e14e (bia 0050.56bb.e14e)
  Description: MANAGEMENT INTERFACE - DON'T TOUCH ME
  Internet address is 10.10.20.48/24
  MTU 1500 bytes, BW 1000000 Kbit/sec, DLY 10 usec,
     reliability 255/255, txload 1/255, rxload 1/255
  Encapsulation ARPA, loopback not set
     208231 packets input, 28196386 bytes, 0 no buffer
     123948 packets output, 22134531 bytes, 0 underruns
";

    #[test]
    fn test_detail_fields() {
        let record = parse_interface_detail("GigabitEthernet1", DETAIL);
        assert_eq!(record.name, "GigabitEthernet1");
        assert_eq!(record.status.as_deref(), Some("up"));
        assert_eq!(record.protocol.as_deref(), Some("up"));
        assert_eq!(record.mac_address.as_deref(), Some("0050.56bb.e14e"));
        assert_eq!(record.ip_address.as_deref(), Some("10.10.20.48/24"));
        assert_eq!(record.mtu, Some(1500));
        assert_eq!(record.bandwidth, Some(1000000));
        assert_eq!(
            record.description.as_deref(),
            Some("MANAGEMENT INTERFACE - DON'T TOUCH ME")
        );
        assert_eq!(record.packets_input, Some(208231));
        assert_eq!(record.packets_output, Some(123948));
    }

    #[test]
    fn test_detail_without_description() {
        let text = "Gi0/1 is administratively down, line protocol is down\n  MTU 1500 bytes, BW 1000000 Kbit/sec\n";
        let record = parse_interface_detail("Gi0/1", text);
        assert_eq!(record.status.as_deref(), Some("administratively down"));
        assert_eq!(record.mtu, Some(1500));
        assert_eq!(record.bandwidth, Some(1000000));
        assert_eq!(record.description, None);
        assert_eq!(record.mac_address, None);

        let json = serde_json::to_value(&record).unwrap();
        assert!(json.get("description").is_none());
        assert!(json.get("packets_input").is_none());
    }

    #[test]
    fn test_overflowing_counter_is_omitted() {
        let text = "  99999999999999999999999 packets input\n  MTU 9216 bytes";
        let record = parse_interface_detail("Et1", text);
        assert_eq!(record.packets_input, None);
        assert_eq!(record.mtu, Some(9216));
    }
}
