use crate::domain::model::{ProcessedRow, RawArticle, ScoredArticle, PROCESSED_COLUMNS, RAW_COLUMNS};
use crate::domain::services::{decode_entity_list, encode_entity_list};
use crate::utils::error::{EtlError, Result};
use csv::{ReaderBuilder, WriterBuilder};
use serde::de::DeserializeOwned;
use serde::Serialize;

fn read_rows<T: DeserializeOwned>(data: &[u8]) -> Result<Vec<T>> {
    let mut reader = ReaderBuilder::new().from_reader(data);
    let mut rows = Vec::new();
    for result in reader.deserialize() {
        let row: T = result?;
        rows.push(row);
    }
    Ok(rows)
}

/// The header is written explicitly so an empty batch still yields a
/// column-complete file.
fn write_rows<T: Serialize>(columns: &[&str], rows: impl IntoIterator<Item = T>) -> Result<Vec<u8>> {
    let mut writer = WriterBuilder::new()
        .has_headers(false)
        .from_writer(Vec::new());
    writer.write_record(columns)?;
    for row in rows {
        writer.serialize(row)?;
    }
    writer.into_inner().map_err(|e| EtlError::IoError(e.into_error()))
}

pub fn decode_raw_articles(data: &[u8]) -> Result<Vec<RawArticle>> {
    read_rows(data)
}

pub fn encode_raw_articles(articles: &[RawArticle]) -> Result<Vec<u8>> {
    write_rows(&RAW_COLUMNS, articles)
}

pub fn to_processed_row(article: &ScoredArticle) -> ProcessedRow {
    ProcessedRow {
        published_at: article.published_at.clone(),
        title: article.title.clone(),
        risk_score: article.risk_score,
        entities: encode_entity_list(&article.entities),
        source: article.source.clone(),
        url: article.url.clone(),
        description: article.description.clone(),
    }
}

pub fn from_processed_row(row: ProcessedRow) -> ScoredArticle {
    ScoredArticle {
        entities: decode_entity_list(&row.entities),
        title: row.title,
        description: row.description,
        url: row.url,
        published_at: row.published_at,
        source: row.source,
        risk_score: row.risk_score,
    }
}

pub fn encode_processed_articles(articles: &[ScoredArticle]) -> Result<Vec<u8>> {
    write_rows(&PROCESSED_COLUMNS, articles.iter().map(to_processed_row))
}

pub fn decode_processed_articles(data: &[u8]) -> Result<Vec<ScoredArticle>> {
    let rows: Vec<ProcessedRow> = read_rows(data)?;
    Ok(rows.into_iter().map(from_processed_row).collect())
}
