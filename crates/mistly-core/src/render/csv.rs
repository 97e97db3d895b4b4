// CSV: header row plus one record per endpoint, standard quoting.

use crate::error::CoreError;
use crate::report::{COLUMNS, EndpointRow};

pub fn render(rows: &[EndpointRow]) -> Result<Vec<u8>, CoreError> {
    let mut writer = ::csv::Writer::from_writer(Vec::new());
    writer.write_record(COLUMNS)?;
    for row in rows {
        writer.write_record(row.values())?;
    }
    writer
        .into_inner()
        .map_err(|e| CoreError::Csv(e.into_error().into()))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::report::{NOT_AVAILABLE, UNKNOWN};

    fn row(name: &str, labels: &str) -> EndpointRow {
        EndpointRow {
            name: name.into(),
            mac: "AABBCCDDEE01".into(),
            labels: labels.into(),
            description: String::new(),
            last_seen: "Never".into(),
            site_name: UNKNOWN.into(),
            connection_type: UNKNOWN.into(),
            ssid_or_port: NOT_AVAILABLE.into(),
            auth_type: NOT_AVAILABLE.into(),
            matched_rule: NOT_AVAILABLE.into(),
        }
    }

    #[test]
    fn header_only_for_empty_report() {
        let out = String::from_utf8(render(&[]).unwrap()).unwrap();
        assert_eq!(
            out,
            "Name,MAC Address,Labels,Description,Last Seen,Site,Connection Type,SSID/Port,Auth Type,Matched Auth Policy Rule\n"
        );
    }

    #[test]
    fn quotes_fields_with_commas_and_quotes() {
        let out = String::from_utf8(render(&[row("Bob's \"PC\"", "a, b")]).unwrap()).unwrap();
        let line = out.lines().nth(1).unwrap();
        assert!(line.starts_with("\"Bob's \"\"PC\"\"\",AABBCCDDEE01,\"a, b\","));
    }

    #[test]
    fn reads_back_with_csv_reader() {
        let bytes = render(&[row("one", ""), row("two", "x")]).unwrap();
        let mut reader = ::csv::Reader::from_reader(bytes.as_slice());
        let names: Vec<String> = reader
            .records()
            .map(|r| r.unwrap().get(0).unwrap().to_owned())
            .collect();
        assert_eq!(names, ["one", "two"]);
    }
}
