//! efetch XML parser using quick-xml
//!
//! Streaming parser for `PubmedArticleSet` responses. Only the fields the
//! harvest needs are extracted: title, journal, publication date, DOI and
//! the author list.

use anyhow::{Context, Result};
use pubrecon_core::{AuthorName, RawCandidate};
use quick_xml::Reader;
use quick_xml::events::Event;

/// Parse every `<PubmedArticle>` in an efetch response.
///
/// An article that fails to parse is logged and skipped.
pub fn parse_efetch_xml(xml: &str) -> Result<Vec<RawCandidate>> {
    // whitespace is kept so inline markup in titles does not glue words
    let mut reader = Reader::from_str(xml);

    let mut records = Vec::new();
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) if e.name().as_ref() == b"PubmedArticle" => {
                match parse_article(&mut reader) {
                    Ok(record) => records.push(record),
                    Err(e) => log::debug!("Failed to parse article: {}", e),
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(e).context("XML parse error"),
            _ => {}
        }
        buf.clear();
    }

    Ok(records)
}

fn parse_article(reader: &mut Reader<&[u8]>) -> Result<RawCandidate> {
    let mut record = RawCandidate::default();
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) => match e.name().as_ref() {
                b"Article" => parse_article_element(reader, &mut record)?,
                b"ArticleIdList" => {
                    // PubmedData DOI wins over the ELocationID one
                    if let Some(doi) = parse_article_id_list(reader)? {
                        record.doi = Some(doi);
                    }
                }
                _ => {}
            },
            Event::End(e) if e.name().as_ref() == b"PubmedArticle" => break,
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    Ok(record)
}

fn parse_article_element(reader: &mut Reader<&[u8]>, record: &mut RawCandidate) -> Result<()> {
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) => match e.name().as_ref() {
                b"Journal" => parse_journal(reader, record)?,
                b"ArticleTitle" => {
                    record.title = Some(read_text_content(reader, b"ArticleTitle")?)
                }
                b"AuthorList" => record.authors = parse_author_list(reader)?,
                b"ELocationID" => {
                    let is_doi = e.attributes().flatten().any(|attr| {
                        attr.key.as_ref() == b"EIdType" && attr.value.as_ref() == b"doi"
                    });
                    let value = read_text(reader)?;
                    if is_doi && record.doi.is_none() {
                        record.doi = Some(value);
                    }
                }
                _ => {}
            },
            Event::End(e) if e.name().as_ref() == b"Article" => break,
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    Ok(())
}

fn parse_journal(reader: &mut Reader<&[u8]>, record: &mut RawCandidate) -> Result<()> {
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) => match e.name().as_ref() {
                b"Title" => record.journal = Some(read_text(reader)?),
                b"PubDate" => record.publication_date = parse_pub_date(reader)?,
                _ => {}
            },
            Event::End(e) if e.name().as_ref() == b"Journal" => break,
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    Ok(())
}

/// `YYYY-MM-DD`, `YYYY-MM` or `YYYY`, depending on what the record carries.
/// A `MedlineDate` such as `2019 Nov-Dec` contributes only its year.
fn parse_pub_date(reader: &mut Reader<&[u8]>) -> Result<Option<String>> {
    let mut buf = Vec::new();
    let mut year = None;
    let mut month = None;
    let mut day = None;
    let mut medline = None;

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) => match e.name().as_ref() {
                b"Year" => year = read_text(reader)?.parse::<i32>().ok(),
                b"Month" => month = parse_month(&read_text(reader)?),
                b"Day" => day = read_text(reader)?.parse::<u32>().ok(),
                b"MedlineDate" => medline = Some(read_text(reader)?),
                _ => {}
            },
            Event::End(e) if e.name().as_ref() == b"PubDate" => break,
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    let date = match (year, month, day) {
        (Some(y), Some(m), Some(d)) => Some(format!("{y:04}-{m:02}-{d:02}")),
        (Some(y), Some(m), None) => Some(format!("{y:04}-{m:02}")),
        (Some(y), None, _) => Some(format!("{y:04}")),
        (None, ..) => medline.as_deref().and_then(leading_year),
    };
    Ok(date)
}

fn parse_month(s: &str) -> Option<u32> {
    // Handle both numeric and text months
    match s.parse::<u32>() {
        Ok(n) if (1..=12).contains(&n) => Some(n),
        Ok(_) => None,
        Err(_) => match s.get(..3)?.to_lowercase().as_str() {
            "jan" => Some(1),
            "feb" => Some(2),
            "mar" => Some(3),
            "apr" => Some(4),
            "may" => Some(5),
            "jun" => Some(6),
            "jul" => Some(7),
            "aug" => Some(8),
            "sep" => Some(9),
            "oct" => Some(10),
            "nov" => Some(11),
            "dec" => Some(12),
            _ => None,
        },
    }
}

/// First run of four digits, e.g. `1998` in `1998 Dec-1999 Jan`.
fn leading_year(s: &str) -> Option<String> {
    s.split(|c: char| !c.is_ascii_digit())
        .find(|run| run.len() == 4)
        .map(str::to_string)
}

fn parse_author_list(reader: &mut Reader<&[u8]>) -> Result<Vec<AuthorName>> {
    let mut authors = Vec::new();
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) if e.name().as_ref() == b"Author" => {
                authors.push(parse_author(reader)?);
            }
            Event::End(e) if e.name().as_ref() == b"AuthorList" => break,
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    Ok(authors)
}

/// Collective authors keep their slot in the list with no personal names,
/// so positions of the remaining authors stay correct.
fn parse_author(reader: &mut Reader<&[u8]>) -> Result<AuthorName> {
    let mut author = AuthorName::default();
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) => match e.name().as_ref() {
                b"LastName" => author.last_name = Some(read_text(reader)?),
                b"ForeName" => author.fore_name = Some(read_text(reader)?),
                b"Initials" => author.initials = Some(read_text(reader)?),
                b"AffiliationInfo" => {
                    let affiliation = parse_affiliation(reader)?;
                    if author.affiliation.is_none() {
                        author.affiliation = affiliation;
                    }
                }
                _ => {}
            },
            Event::End(e) if e.name().as_ref() == b"Author" => break,
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    Ok(author)
}

fn parse_affiliation(reader: &mut Reader<&[u8]>) -> Result<Option<String>> {
    let mut buf = Vec::new();
    let mut affiliation = None;

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) if e.name().as_ref() == b"Affiliation" => {
                affiliation = Some(read_text(reader)?);
            }
            Event::End(e) if e.name().as_ref() == b"AffiliationInfo" => break,
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    Ok(affiliation)
}

fn parse_article_id_list(reader: &mut Reader<&[u8]>) -> Result<Option<String>> {
    let mut buf = Vec::new();
    let mut doi = None;

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) if e.name().as_ref() == b"ArticleId" => {
                let mut id_type = String::new();
                for attr in e.attributes().flatten() {
                    if attr.key.as_ref() == b"IdType" {
                        id_type = String::from_utf8_lossy(&attr.value).to_string();
                    }
                }
                let value = read_text(reader)?;
                if id_type == "doi" {
                    doi = Some(value);
                }
            }
            Event::End(e) if e.name().as_ref() == b"ArticleIdList" => break,
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    Ok(doi)
}

/// Read text content until next end tag, trimmed
fn read_text(reader: &mut Reader<&[u8]>) -> Result<String> {
    Ok(read_raw_text(reader)?.trim().to_string())
}

fn read_raw_text(reader: &mut Reader<&[u8]>) -> Result<String> {
    let mut buf = Vec::new();
    let mut text = String::new();

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Text(e) => text.push_str(&e.unescape()?),
            Event::End(_) => break,
            Event::Start(_) => {
                // nested markup such as <i> or <sup>
                text.push_str(&read_raw_text(reader)?);
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    Ok(text)
}

/// Read text content of a specific element, handling nested tags.
/// Runs of whitespace collapse to one space.
fn read_text_content(reader: &mut Reader<&[u8]>, end_tag: &[u8]) -> Result<String> {
    let mut buf = Vec::new();
    let mut text = String::new();
    let mut depth = 1;

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Text(e) => text.push_str(&e.unescape()?),
            Event::Start(_) => depth += 1,
            Event::End(e) => {
                depth -= 1;
                if depth == 0 && e.name().as_ref() == end_tag {
                    break;
                }
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    Ok(text.split_whitespace().collect::<Vec<_>>().join(" "))
}
