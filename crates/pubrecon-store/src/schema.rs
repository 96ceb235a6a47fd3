//! Closed table and column vocabulary plus DDL.
//!
//! Every statement the store issues names its table and columns through
//! these enums; identifiers are never taken from input.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Table {
    Resident,
    Author,
    Journal,
    Publication,
    AuthorPublication,
}

impl Table {
    pub const ALL: [Table; 5] = [
        Table::Resident,
        Table::Author,
        Table::Journal,
        Table::Publication,
        Table::AuthorPublication,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::Resident => "resident",
            Self::Author => "author",
            Self::Journal => "journal",
            Self::Publication => "publication",
            Self::AuthorPublication => "author_publication",
        }
    }

    /// Columns in storage order; the primary key is always first.
    pub fn columns(self) -> &'static [Column] {
        use Column::*;
        match self {
            Self::Resident => &[ResidentId, FirstName, MiddleName, LastName, MatchYear, GradYear],
            Self::Author => &[AuthorId, AuthorResident, Affiliation, FirstAttendingYear],
            Self::Journal => &[JournalId, JournalName],
            Self::Publication => &[
                PublicationId,
                PublicationJournal,
                Title,
                Doi,
                DatePublished,
            ],
            Self::AuthorPublication => &[LinkId, LinkAuthor, LinkPublication, OrderOfAuthorship],
        }
    }

    pub fn id_column(self) -> Column {
        self.columns()[0]
    }

    fn sequence(self) -> String {
        format!("seq_{}", self.name())
    }

    /// `CREATE SEQUENCE` + `CREATE TABLE`, both idempotent.
    pub fn create_sql(self) -> String {
        let columns: Vec<String> = self
            .columns()
            .iter()
            .map(|c| {
                if *c == self.id_column() {
                    format!(
                        "{} BIGINT PRIMARY KEY DEFAULT nextval('{}')",
                        c.name(),
                        self.sequence()
                    )
                } else {
                    let not_null = if c.required() { " NOT NULL" } else { "" };
                    format!("{} {}{not_null}", c.name(), c.kind().sql_type())
                }
            })
            .collect();
        format!(
            "CREATE SEQUENCE IF NOT EXISTS {seq} START 1;\n\
             CREATE TABLE IF NOT EXISTS {table} ({columns});",
            seq = self.sequence(),
            table = self.name(),
            columns = columns.join(", ")
        )
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Storage class of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Int,
    Text,
}

impl ColumnKind {
    fn sql_type(self) -> &'static str {
        match self {
            Self::Int => "BIGINT",
            Self::Text => "VARCHAR",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Column {
    // resident
    ResidentId,
    FirstName,
    MiddleName,
    LastName,
    MatchYear,
    GradYear,
    // author
    AuthorId,
    AuthorResident,
    Affiliation,
    FirstAttendingYear,
    // journal
    JournalId,
    JournalName,
    // publication
    PublicationId,
    PublicationJournal,
    Title,
    Doi,
    DatePublished,
    // author_publication
    LinkId,
    LinkAuthor,
    LinkPublication,
    OrderOfAuthorship,
}

impl Column {
    pub fn table(self) -> Table {
        use Column::*;
        match self {
            ResidentId | FirstName | MiddleName | LastName | MatchYear | GradYear => Table::Resident,
            AuthorId | AuthorResident | Affiliation | FirstAttendingYear => Table::Author,
            JournalId | JournalName => Table::Journal,
            PublicationId | PublicationJournal | Title | Doi | DatePublished => Table::Publication,
            LinkId | LinkAuthor | LinkPublication | OrderOfAuthorship => Table::AuthorPublication,
        }
    }

    pub fn name(self) -> &'static str {
        use Column::*;
        match self {
            ResidentId | AuthorId | JournalId | PublicationId | LinkId => "id",
            FirstName => "first_name",
            MiddleName => "middle_name",
            LastName => "last_name",
            MatchYear => "match_year",
            GradYear => "grad_year",
            AuthorResident => "resident_id",
            Affiliation => "affiliation",
            FirstAttendingYear => "first_attending_year",
            JournalName => "name",
            PublicationJournal => "journal_id",
            Title => "title",
            Doi => "doi",
            DatePublished => "date_published",
            LinkAuthor => "author_id",
            LinkPublication => "publication_id",
            OrderOfAuthorship => "order_of_authorship",
        }
    }

    pub fn kind(self) -> ColumnKind {
        use Column::*;
        match self {
            ResidentId | MatchYear | GradYear | AuthorId | AuthorResident | FirstAttendingYear
            | JournalId | PublicationId | PublicationJournal | LinkId | LinkAuthor
            | LinkPublication => ColumnKind::Int,
            FirstName | MiddleName | LastName | Affiliation | JournalName | Title | Doi
            | DatePublished | OrderOfAuthorship => ColumnKind::Text,
        }
    }

    fn required(self) -> bool {
        use Column::*;
        matches!(
            self,
            FirstName
                | LastName
                | MatchYear
                | GradYear
                | AuthorResident
                | JournalName
                | PublicationJournal
                | Title
                | LinkAuthor
                | LinkPublication
        )
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.table().name(), self.name())
    }
}

/// Full schema bootstrap script.
pub fn create_schema_sql() -> String {
    Table::ALL
        .iter()
        .map(|t| t.create_sql())
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_column_belongs_to_its_table() {
        for table in Table::ALL {
            for column in table.columns() {
                assert_eq!(column.table(), table, "{column}");
            }
            assert_eq!(table.id_column().name(), "id");
            assert_eq!(table.id_column().kind(), ColumnKind::Int);
        }
    }

    #[test]
    fn ddl_is_idempotent_and_sequenced() {
        let sql = Table::Journal.create_sql();
        assert!(sql.contains("CREATE SEQUENCE IF NOT EXISTS seq_journal"));
        assert!(sql.contains(
            "CREATE TABLE IF NOT EXISTS journal (id BIGINT PRIMARY KEY DEFAULT nextval('seq_journal'), name VARCHAR NOT NULL)"
        ));
    }

    #[test]
    fn link_table_columns() {
        let names: Vec<&str> = Table::AuthorPublication
            .columns()
            .iter()
            .map(|c| c.name())
            .collect();
        assert_eq!(
            names,
            ["id", "author_id", "publication_id", "order_of_authorship"]
        );
    }
}
