use crate::error::{ProcessingError, Result};
use crate::models::{StationSummary, TrackedVariable};
use crate::utils::constants::{
    COMPRESSION_GZIP, COMPRESSION_LZ4, COMPRESSION_NONE, COMPRESSION_SNAPPY, COMPRESSION_ZSTD,
    DEFAULT_ROW_GROUP_SIZE,
};
use arrow::array::{
    ArrayRef, Date32Array, Float64Array, Int64Array, StringArray, UInt32Array, UInt64Array,
};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use chrono::{Datelike, NaiveDate};
use parquet::arrow::ArrowWriter;
use parquet::basic::{Compression, GzipLevel, ZstdLevel};
use parquet::file::properties::WriterProperties;
use std::io::Write;
use std::sync::Arc;

/// Writes station summaries as a single-table Parquet file.
pub struct SummaryParquetWriter {
    compression: Compression,
    row_group_size: usize,
}

impl SummaryParquetWriter {
    pub fn new() -> Self {
        Self {
            compression: Compression::SNAPPY,
            row_group_size: DEFAULT_ROW_GROUP_SIZE,
        }
    }

    pub fn with_compression(mut self, compression: &str) -> Result<Self> {
        self.compression = match compression.to_lowercase().as_str() {
            COMPRESSION_SNAPPY => Compression::SNAPPY,
            COMPRESSION_GZIP => Compression::GZIP(GzipLevel::default()),
            COMPRESSION_LZ4 => Compression::LZ4,
            COMPRESSION_ZSTD => Compression::ZSTD(ZstdLevel::default()),
            COMPRESSION_NONE => Compression::UNCOMPRESSED,
            _ => {
                return Err(ProcessingError::Config(format!(
                    "Unsupported compression: {}",
                    compression
                )))
            }
        };
        Ok(self)
    }

    pub fn with_row_group_size(mut self, size: usize) -> Self {
        self.row_group_size = size;
        self
    }

    pub fn write<W: Write + Send>(&self, summaries: &[StationSummary], sink: W) -> Result<()> {
        let schema = Self::create_schema();
        let props = WriterProperties::builder()
            .set_compression(self.compression)
            .set_max_row_group_size(self.row_group_size)
            .build();

        let mut writer = ArrowWriter::try_new(sink, schema.clone(), Some(props))?;
        for chunk in summaries.chunks(self.row_group_size.max(1)) {
            let batch = Self::summaries_to_batch(chunk, schema.clone())?;
            writer.write(&batch)?;
        }
        writer.close()?;

        Ok(())
    }

    fn create_schema() -> Arc<Schema> {
        let mut fields = vec![
            Field::new("insee_id", DataType::Utf8, false),
            Field::new("region", DataType::Utf8, false),
            Field::new("lat", DataType::Float64, false),
            Field::new("lng", DataType::Float64, false),
            Field::new("days", DataType::UInt32, false),
        ];
        fields.extend(
            TrackedVariable::ALL
                .iter()
                .map(|v| Field::new(v.column_name(), DataType::UInt32, false)),
        );
        fields.extend([
            Field::new("first_date", DataType::Date32, false),
            Field::new("last_date", DataType::Date32, false),
            Field::new("period_days", DataType::Int64, false),
            Field::new("region_count", DataType::UInt64, false),
            Field::new("coordinate_count", DataType::UInt64, false),
            Field::new("regions", DataType::Utf8, false),
            Field::new("coordinates", DataType::Utf8, false),
        ]);

        Arc::new(Schema::new(fields))
    }

    fn summaries_to_batch(
        summaries: &[StationSummary],
        schema: Arc<Schema>,
    ) -> Result<RecordBatch> {
        let mut columns: Vec<ArrayRef> = vec![
            Arc::new(StringArray::from_iter_values(
                summaries.iter().map(|s| s.station_id.as_str()),
            )),
            Arc::new(StringArray::from_iter_values(
                summaries.iter().map(|s| s.region.as_str()),
            )),
            Arc::new(Float64Array::from_iter_values(
                summaries.iter().map(|s| s.latitude),
            )),
            Arc::new(Float64Array::from_iter_values(
                summaries.iter().map(|s| s.longitude),
            )),
            Arc::new(UInt32Array::from_iter_values(
                summaries.iter().map(|s| s.day_count),
            )),
        ];

        for variable in TrackedVariable::ALL {
            columns.push(Arc::new(UInt32Array::from_iter_values(
                summaries.iter().map(|s| s.variable_counts.get(variable)),
            )));
        }

        columns.extend([
            Arc::new(Date32Array::from_iter_values(
                summaries.iter().map(|s| days_since_epoch(s.first_date)),
            )) as ArrayRef,
            Arc::new(Date32Array::from_iter_values(
                summaries.iter().map(|s| days_since_epoch(s.last_date)),
            )) as ArrayRef,
            Arc::new(Int64Array::from_iter_values(
                summaries.iter().map(|s| s.period_days),
            )) as ArrayRef,
            Arc::new(UInt64Array::from_iter_values(
                summaries.iter().map(|s| s.region_count as u64),
            )) as ArrayRef,
            Arc::new(UInt64Array::from_iter_values(
                summaries.iter().map(|s| s.coordinate_count as u64),
            )) as ArrayRef,
            Arc::new(StringArray::from_iter_values(
                summaries.iter().map(|s| s.regions_list()),
            )) as ArrayRef,
            Arc::new(StringArray::from_iter_values(
                summaries.iter().map(|s| s.coordinates_list()),
            )) as ArrayRef,
        ]);

        Ok(RecordBatch::try_new(schema, columns)?)
    }
}

impl Default for SummaryParquetWriter {
    fn default() -> Self {
        Self::new()
    }
}

/// Days from 0001-01-01 to 1970-01-01
const UNIX_EPOCH_DAYS_FROM_CE: i32 = 719_163;

/// Arrow Date32 counts days from 1970-01-01
fn days_since_epoch(date: NaiveDate) -> i32 {
    date.num_days_from_ce() - UNIX_EPOCH_DAYS_FROM_CE
}
