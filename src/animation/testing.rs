//! Container fixtures for unit tests.

use super::codec::CompressionType;

/// Builds container bytes from full frames or raw deltas.
pub(crate) struct ContainerBuilder {
    fields: [i32; 4],
    compression: CompressionType,
    frame_count: i32,
    records: Vec<u8>,
    previous: Vec<u8>,
}

impl ContainerBuilder {
    pub(crate) fn new(
        frame_rate: i32,
        width: i32,
        height: i32,
        bytes_per_row: i32,
        compression: CompressionType,
    ) -> Self {
        let frame_size = (bytes_per_row.max(0) * height.max(0)) as usize;
        Self {
            fields: [frame_rate, width, height, bytes_per_row],
            compression,
            frame_count: 0,
            records: Vec::new(),
            previous: vec![0; frame_size.min(1 << 20)],
        }
    }

    /// Append a full frame, stored as the delta against the previous one.
    pub(crate) fn push_frame(&mut self, frame: &[u8]) -> &mut Self {
        let delta: Vec<u8> = frame.iter().zip(&self.previous).map(|(a, b)| a ^ b).collect();
        self.previous = frame.to_vec();
        self.push_delta(&delta)
    }

    /// Append a delta, compressed with the builder's compression.
    pub(crate) fn push_delta(&mut self, delta: &[u8]) -> &mut Self {
        let payload = match self.compression {
            CompressionType::Stored => delta.to_vec(),
            CompressionType::Lz4 => lz4_flex::block::compress(delta),
        };
        self.push_raw_record(&payload)
    }

    /// Append a record with `payload` as-is.
    pub(crate) fn push_raw_record(&mut self, payload: &[u8]) -> &mut Self {
        self.records
            .extend_from_slice(&(payload.len() as i32).to_le_bytes());
        self.records.extend_from_slice(payload);
        self.frame_count += 1;
        self
    }

    pub(crate) fn build(&self) -> Vec<u8> {
        let [frame_rate, width, height, bytes_per_row] = self.fields;
        let mut bytes: Vec<u8> = [frame_rate, self.frame_count, width, height, bytes_per_row]
            .iter()
            .flat_map(|f| f.to_le_bytes())
            .collect();
        bytes.extend_from_slice(&self.records);
        bytes
    }
}
