use ratatui::buffer::Buffer;
use waterline_core::{DataType, SensorReading};

/// Reading at `epoch` ms with `level` cm on a GSM link.
pub fn reading(epoch: i64, level: f64) -> SensorReading {
    SensorReading {
        timestamp: format!("t{epoch}"),
        timestamp_epoch: epoch,
        network: "GSM".into(),
        sim: String::new(),
        sim_operator: "Carrier".into(),
        wifi_strength: 0.0,
        gsm_strength: 18.0,
        water_level: level,
        status: "Good".into(),
        sd_size: 1024.0,
        sd_remaining: 512.0,
        device: "Tank".into(),
        data_type: DataType::Live,
        sms_status: "None".into(),
    }
}

/// Every cell symbol, row by row.
pub fn buffer_text(buffer: &Buffer) -> String {
    let width = usize::from(buffer.area.width.max(1));
    buffer
        .content
        .chunks(width)
        .map(|row| row.iter().map(ratatui::buffer::Cell::symbol).collect::<String>())
        .collect::<Vec<_>>()
        .join("\n")
}
