use indicatif::ProgressBar;
use pubrecon_core::{
    CandidateIndex, DateRange, LiteratureSource, RawCandidate, ResidentRecord, RetryPolicy,
    SourceError, save_candidates,
};
use pubrecon_pubmed::{harvest, parser::parse_efetch_xml};
use tempfile::TempDir;

const EFETCH: &str = r#"<?xml version="1.0" ?>
<!DOCTYPE PubmedArticleSet PUBLIC "-//NLM//DTD PubMedArticle, 1st January 2024//EN" "https://dtd.nlm.nih.gov/ncbi/pubmed/out/pubmed_240101.dtd">
<PubmedArticleSet>
<PubmedArticle>
  <MedlineCitation Status="MEDLINE" Owner="NLM">
    <PMID Version="1">30000001</PMID>
    <Article PubModel="Print">
      <Journal>
        <JournalIssue CitedMedium="Internet">
          <PubDate><Year>2018</Year><Month>Mar</Month></PubDate>
        </JournalIssue>
        <Title>Journal of Surgical Education</Title>
      </Journal>
      <ArticleTitle>Resident autonomy in the operating room.</ArticleTitle>
      <AuthorList CompleteYN="Y">
        <Author ValidYN="Y"><LastName>Lee</LastName><ForeName>Ann</ForeName><Initials>A</Initials></Author>
        <Author ValidYN="Y"><LastName>Roe</LastName><ForeName>John</ForeName><Initials>J</Initials></Author>
        <Author ValidYN="Y"><LastName>Doe</LastName><ForeName>Jane</ForeName><Initials>J</Initials></Author>
      </AuthorList>
    </Article>
  </MedlineCitation>
  <PubmedData>
    <ArticleIdList>
      <ArticleId IdType="pubmed">30000001</ArticleId>
      <ArticleId IdType="doi">10.1016/j.jsurg.2018.01.001</ArticleId>
    </ArticleIdList>
  </PubmedData>
</PubmedArticle>
<PubmedArticle>
  <MedlineCitation Status="MEDLINE" Owner="NLM">
    <PMID Version="1">30000002</PMID>
    <Article PubModel="Print">
      <Journal>
        <JournalIssue CitedMedium="Print">
          <PubDate><MedlineDate>2017 Nov-Dec</MedlineDate></PubDate>
        </JournalIssue>
        <Title>Annals of Surgery</Title>
      </Journal>
      <ArticleTitle>Another Doe entirely.</ArticleTitle>
      <AuthorList CompleteYN="Y">
        <Author ValidYN="Y"><LastName>Doe</LastName><ForeName>Janet</ForeName><Initials>J</Initials></Author>
      </AuthorList>
    </Article>
  </MedlineCitation>
</PubmedArticle>
</PubmedArticleSet>"#;

/// Serves the parsed efetch sample for every search.
struct XmlSource;

impl LiteratureSource for XmlSource {
    fn name(&self) -> &str {
        "xml"
    }

    fn search(
        &self,
        _name_variants: &[String],
        _range: Option<DateRange>,
    ) -> Result<Vec<RawCandidate>, SourceError> {
        parse_efetch_xml(EFETCH).map_err(|e| SourceError::Parse(e.to_string()))
    }
}

#[test]
fn harvested_candidates_load_as_index() {
    let resident = ResidentRecord {
        id: 1,
        first_name: "Jane".into(),
        middle_name: None,
        last_name: "Doe".into(),
        match_year: 2014,
        grad_year: 2020,
    };
    let out = harvest(
        &XmlSource,
        &[resident],
        &RetryPolicy::default(),
        &ProgressBar::hidden(),
    );
    assert_eq!(out.stats.fetched, 2);
    assert_eq!(out.stats.not_author, 1);
    assert_eq!(out.stats.kept, 1);

    let dir = TempDir::new().unwrap();
    let path = dir.path().join("out").join("candidates.json");
    save_candidates(&out.entries, &path).unwrap();

    let index = CandidateIndex::load(&path).unwrap();
    assert_eq!(index.resident_count(), 1);
    let candidates = index.get("Jane Doe");
    assert_eq!(candidates.len(), 1);
    assert_eq!(candidates[0].journal, "Journal of Surgical Education");
    assert_eq!(candidates[0].publication_date.to_string(), "2018-03-01");
    assert_eq!(candidates[0].doi.as_deref(), Some("10.1016/j.jsurg.2018.01.001"));
    assert_eq!(candidates[0].authorship.map(|a| a.as_str()), Some("last"));
}
