//! In-memory Oracle session for integration tests.
//!
//! Understands the DDL this crate emits and answers the catalog queries in
//! `ora_schema::catalog`. Like Oracle, DDL takes effect immediately and is
//! not undone by a rollback.

#![allow(dead_code)]

use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use ora_schema::catalog::{
    SQL_COLUMN_EXISTS, SQL_INDEX_EXISTS, SQL_LIST_COLUMNS, SQL_LIST_INDEX_COLUMNS,
    SQL_LIST_INSERT_TRIGGERS, SQL_LIST_PRIMARY_KEY_COLUMNS, SQL_LIST_SEQUENCES, SQL_LIST_TABLES,
    SQL_TABLE_EXISTS,
};
use ora_schema::core::{Params, QueryEngine, Row, SqlLog, SqlValue};
use ora_schema::{OracleTableSchema, Result, SchemaError};

/// Connected user, as given at login.
pub const USER: &str = "app";
/// Owner the catalog stores objects under.
pub const OWNER: &str = "APP";

#[derive(Debug, Clone)]
pub struct MemColumn {
    pub name: String,
    pub data_type: String,
    pub length: Option<i32>,
    pub scale: Option<i32>,
    pub nullable: bool,
}

#[derive(Debug, Clone)]
pub struct MemTable {
    pub name: String,
    pub columns: Vec<MemColumn>,
    pub primary_key: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct MemIndex {
    pub name: String,
    pub table: String,
    pub unique: bool,
    pub columns: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct MemTrigger {
    pub name: String,
    pub table: String,
    pub body: String,
}

#[derive(Default)]
pub struct State {
    pub tables: Vec<MemTable>,
    pub indexes: Vec<MemIndex>,
    pub sequences: Vec<String>,
    pub triggers: Vec<MemTrigger>,

    /// Every statement passed to `execute_non_query`, in order.
    pub statements: Vec<String>,
    /// `begin`, `commit` and `rollback` calls, in order.
    pub transactions: Vec<&'static str>,
    /// Calls of any kind that reached the session.
    pub calls: usize,
    pub close_calls: usize,
    closed: bool,

    fail_patterns: Vec<String>,
    fail_commit: bool,
    log: Option<SqlLog>,
}

/// Cloneable handle; clones share one session.
#[derive(Clone, Default)]
pub struct MemoryOracle {
    state: Arc<Mutex<State>>,
}

impl MemoryOracle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap()
    }

    /// A schema handle over a clone of this session.
    pub fn schema(&self) -> OracleTableSchema<MemoryOracle> {
        OracleTableSchema::new(self.clone(), USER)
    }

    /// Make every statement containing `pattern` fail.
    pub fn fail_when(&self, pattern: &str) {
        self.state().fail_patterns.push(pattern.to_string());
    }

    pub fn fail_commit(&self) {
        self.state().fail_commit = true;
    }

    /// Apply DDL directly, bypassing recording and failure injection.
    pub fn seed(&self, sql: &str) {
        apply_ddl(&mut self.state(), sql).unwrap();
    }

    pub fn statements(&self) -> Vec<String> {
        self.state().statements.clone()
    }

    pub fn clear_statements(&self) {
        self.state().statements.clear();
    }

    pub fn calls(&self) -> usize {
        self.state().calls
    }

    pub fn has_table(&self, name: &str) -> bool {
        self.state().tables.iter().any(|t| t.name == name)
    }

    pub fn has_sequence(&self, name: &str) -> bool {
        self.state().sequences.iter().any(|s| s == name)
    }

    pub fn has_trigger(&self, name: &str) -> bool {
        self.state().triggers.iter().any(|t| t.name == name)
    }

    pub fn has_index(&self, name: &str) -> bool {
        self.state().indexes.iter().any(|i| i.name == name)
    }
}

fn ora(code: i32, message: &str) -> SchemaError {
    SchemaError::execution(Some(code), format!("ORA-{:05}: {}", code, message))
}

fn param<'a>(params: &[(&'a str, &'a str)], name: &str) -> &'a str {
    params
        .iter()
        .find(|(n, _)| *n == name)
        .map(|(_, v)| *v)
        .unwrap_or("")
}

fn text(s: &str) -> SqlValue {
    SqlValue::Text(s.to_string())
}

fn count_row(n: usize) -> Vec<Row> {
    vec![Row::new(vec![SqlValue::Int(n as i64)])]
}

impl State {
    fn table(&self, name: &str) -> Option<&MemTable> {
        self.tables.iter().find(|t| t.name == name)
    }

    fn table_mut(&mut self, name: &str) -> Result<&mut MemTable> {
        self.tables
            .iter_mut()
            .find(|t| t.name == name)
            .ok_or_else(|| ora(942, "table or view does not exist"))
    }

    /// Tables, indexes and sequences share one namespace.
    fn name_in_use(&self, name: &str) -> bool {
        self.tables.iter().any(|t| t.name == name)
            || self.indexes.iter().any(|i| i.name == name)
            || self.sequences.iter().any(|s| s == name)
    }

    fn answer(&self, sql: &str, params: Params<'_>) -> Result<Vec<Row>> {
        let owner = param(params, "owner");
        let table = param(params, "table_name");
        if owner != OWNER {
            return Ok(if sql.starts_with("SELECT COUNT(1)") {
                count_row(0)
            } else {
                Vec::new()
            });
        }

        let rows = if sql == SQL_LIST_TABLES {
            self.tables
                .iter()
                .map(|t| Row::new(vec![text(&t.name)]))
                .collect()
        } else if sql == SQL_LIST_COLUMNS {
            self.table(table)
                .map(|t| {
                    t.columns
                        .iter()
                        .enumerate()
                        .map(|(i, c)| column_row(i, c))
                        .collect()
                })
                .unwrap_or_default()
        } else if sql == SQL_LIST_PRIMARY_KEY_COLUMNS {
            self.table(table)
                .map(|t| t.primary_key.iter().map(|k| Row::new(vec![text(k)])).collect())
                .unwrap_or_default()
        } else if sql == SQL_LIST_INDEX_COLUMNS {
            let mut indexes: Vec<&MemIndex> =
                self.indexes.iter().filter(|i| i.table == table).collect();
            indexes.sort_by(|a, b| a.name.cmp(&b.name));
            indexes
                .into_iter()
                .flat_map(|i| {
                    let uniqueness = if i.unique { "UNIQUE" } else { "NONUNIQUE" };
                    i.columns
                        .iter()
                        .map(move |c| Row::new(vec![text(&i.name), text(c), text(uniqueness)]))
                })
                .collect()
        } else if sql == SQL_LIST_INSERT_TRIGGERS {
            self.triggers
                .iter()
                .filter(|t| t.table == table)
                .map(|t| Row::new(vec![text(&t.name), text(&t.body)]))
                .collect()
        } else if sql == SQL_LIST_SEQUENCES {
            self.sequences.iter().map(|s| Row::new(vec![text(s)])).collect()
        } else if sql == SQL_INDEX_EXISTS {
            let index = param(params, "index_name");
            count_row(
                self.indexes
                    .iter()
                    .filter(|i| i.table == table && i.name == index)
                    .count(),
            )
        } else if sql == SQL_TABLE_EXISTS {
            count_row(usize::from(self.table(table).is_some()))
        } else if sql == SQL_COLUMN_EXISTS {
            let column = param(params, "column_name");
            count_row(
                self.table(table)
                    .map(|t| t.columns.iter().filter(|c| c.name == column).count())
                    .unwrap_or(0),
            )
        } else {
            return Err(ora(900, &format!("invalid SQL statement: {}", sql)));
        };
        Ok(rows)
    }
}

fn column_row(idx: usize, c: &MemColumn) -> Row {
    let length = SqlValue::from(c.length.map(i64::from));
    let (data_length, char_length, precision, scale) = match c.data_type.as_str() {
        "NUMBER" => (
            SqlValue::Int(22),
            SqlValue::Int(0),
            length,
            SqlValue::from(c.scale.map(i64::from)),
        ),
        "RAW" => (length, SqlValue::Int(0), SqlValue::Null, SqlValue::Null),
        _ => (SqlValue::Null, length, SqlValue::Null, SqlValue::Null),
    };
    Row::new(vec![
        SqlValue::Int(idx as i64 + 1),
        text(&c.name),
        text(&c.data_type),
        data_length,
        char_length,
        precision,
        scale,
        text(if c.nullable { "Y" } else { "N" }),
    ])
}

// --- DDL parsing -----------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
enum Tok {
    Ident(String),
    Word(String),
    Sym(char),
}

fn tokenize(sql: &str) -> Vec<Tok> {
    let chars: Vec<char> = sql.chars().collect();
    let mut toks = Vec::new();
    let mut i = 0;
    while i < chars.len() {
        let c = chars[i];
        if c.is_whitespace() {
            i += 1;
        } else if c == '"' {
            let mut s = String::new();
            i += 1;
            while i < chars.len() {
                if chars[i] == '"' {
                    if chars.get(i + 1) == Some(&'"') {
                        s.push('"');
                        i += 2;
                        continue;
                    }
                    i += 1;
                    break;
                }
                s.push(chars[i]);
                i += 1;
            }
            toks.push(Tok::Ident(s));
        } else if c.is_alphanumeric() || c == '_' {
            let start = i;
            while i < chars.len() && (chars[i].is_alphanumeric() || chars[i] == '_') {
                i += 1;
            }
            let word: String = chars[start..i].iter().collect();
            toks.push(Tok::Word(word.to_uppercase()));
        } else {
            toks.push(Tok::Sym(c));
            i += 1;
        }
    }
    toks
}

fn syntax(sql: &str) -> SchemaError {
    ora(900, &format!("invalid SQL statement: {}", sql))
}

struct Parser<'a> {
    sql: &'a str,
    toks: Vec<Tok>,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn new(sql: &'a str) -> Self {
        Self {
            sql,
            toks: tokenize(sql),
            pos: 0,
        }
    }

    fn peek(&self) -> Option<&Tok> {
        self.toks.get(self.pos)
    }

    fn word(&mut self, w: &str) -> bool {
        if self.peek() == Some(&Tok::Word(w.to_string())) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expect_word(&mut self, w: &str) -> Result<()> {
        if self.word(w) {
            Ok(())
        } else {
            Err(syntax(self.sql))
        }
    }

    fn sym(&mut self, c: char) -> bool {
        if self.peek() == Some(&Tok::Sym(c)) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expect_sym(&mut self, c: char) -> Result<()> {
        if self.sym(c) {
            Ok(())
        } else {
            Err(syntax(self.sql))
        }
    }

    fn ident(&mut self) -> Result<String> {
        match self.toks.get(self.pos).cloned() {
            Some(Tok::Ident(s)) | Some(Tok::Word(s)) => {
                self.pos += 1;
                Ok(s)
            }
            _ => Err(syntax(self.sql)),
        }
    }

    fn ident_list(&mut self) -> Result<Vec<String>> {
        self.expect_sym('(')?;
        let mut names = vec![self.ident()?];
        while self.sym(',') {
            names.push(self.ident()?);
        }
        self.expect_sym(')')?;
        Ok(names)
    }

    fn number(&mut self) -> Result<i32> {
        match self.toks.get(self.pos).cloned() {
            Some(Tok::Word(w)) => {
                self.pos += 1;
                w.parse().map_err(|_| syntax(self.sql))
            }
            _ => Err(syntax(self.sql)),
        }
    }

    /// `TYPE[(n[, m])] [words...]`, returning the catalog type name and lengths.
    fn column_type(&mut self) -> Result<(String, Option<i32>, Option<i32>)> {
        let base = match self.toks.get(self.pos).cloned() {
            Some(Tok::Word(w)) => {
                self.pos += 1;
                w
            }
            _ => return Err(syntax(self.sql)),
        };
        let (mut length, mut scale) = (None, None);
        if self.sym('(') {
            length = Some(self.number()?);
            if self.sym(',') {
                scale = Some(self.number()?);
            }
            self.expect_sym(')')?;
        }
        let mut data_type = base.clone();
        if base == "TIMESTAMP" {
            data_type = format!("TIMESTAMP({})", length.unwrap_or(6));
            length = Some(11);
        }
        while let Some(Tok::Word(w)) = self.peek().cloned() {
            if w == "NOT" || w == "NULL" {
                break;
            }
            self.pos += 1;
            data_type.push(' ');
            data_type.push_str(&w);
        }
        Ok((data_type, length, scale))
    }

    /// `[NOT] NULL`, or `None` when absent.
    fn nullability(&mut self) -> Result<Option<bool>> {
        if self.word("NOT") {
            self.expect_word("NULL")?;
            Ok(Some(false))
        } else if self.word("NULL") {
            Ok(Some(true))
        } else {
            Ok(None)
        }
    }

    fn column_def(&mut self) -> Result<(MemColumn, Option<bool>)> {
        let name = self.ident()?;
        let (data_type, length, scale) = self.column_type()?;
        let nullability = self.nullability()?;
        Ok((
            MemColumn {
                name,
                data_type,
                length,
                scale,
                nullable: nullability.unwrap_or(true),
            },
            nullability,
        ))
    }

    fn done(&mut self) -> Result<()> {
        self.sym(';');
        if self.pos == self.toks.len() {
            Ok(())
        } else {
            Err(syntax(self.sql))
        }
    }
}

fn apply_ddl(state: &mut State, sql: &str) -> Result<()> {
    let mut p = Parser::new(sql);

    if p.word("CREATE") {
        if p.word("TABLE") {
            return create_table(state, &mut p);
        }
        if p.word("SEQUENCE") {
            let name = p.ident()?;
            if state.name_in_use(&name) {
                return Err(ora(955, "name is already used by an existing object"));
            }
            state.sequences.push(name);
            return Ok(());
        }
        if p.word("TRIGGER") {
            return create_trigger(state, &mut p, sql);
        }
        let unique = p.word("UNIQUE");
        p.expect_word("INDEX")?;
        let name = p.ident()?;
        p.expect_word("ON")?;
        let table = p.ident()?;
        let columns = p.ident_list()?;
        p.done()?;
        let t = state
            .table(&table)
            .ok_or_else(|| ora(942, "table or view does not exist"))?;
        if let Some(missing) = columns.iter().find(|c| !t.columns.iter().any(|tc| &tc.name == *c)) {
            return Err(ora(904, &format!("\"{}\": invalid identifier", missing)));
        }
        if state.name_in_use(&name) {
            return Err(ora(955, "name is already used by an existing object"));
        }
        if state
            .indexes
            .iter()
            .any(|i| i.table == table && i.columns == columns)
        {
            return Err(ora(1408, "such column list already indexed"));
        }
        state.indexes.push(MemIndex {
            name,
            table,
            unique,
            columns,
        });
        return Ok(());
    }

    if p.word("ALTER") {
        p.expect_word("TABLE")?;
        let table = p.ident()?;
        if p.word("ADD") {
            p.expect_sym('(')?;
            let (column, _) = p.column_def()?;
            p.expect_sym(')')?;
            p.done()?;
            let t = state.table_mut(&table)?;
            if t.columns.iter().any(|c| c.name == column.name) {
                return Err(ora(1430, "column being added already exists in table"));
            }
            t.columns.push(column);
            return Ok(());
        }
        if p.word("MODIFY") {
            p.expect_sym('(')?;
            let (column, nullability) = p.column_def()?;
            p.expect_sym(')')?;
            p.done()?;
            let t = state.table_mut(&table)?;
            let existing = t
                .columns
                .iter_mut()
                .find(|c| c.name == column.name)
                .ok_or_else(|| ora(904, "invalid identifier"))?;
            if nullability == Some(existing.nullable) {
                return Err(ora(1442, "column to be modified to NOT NULL is already NOT NULL"));
            }
            existing.data_type = column.data_type;
            existing.length = column.length;
            existing.scale = column.scale;
            if let Some(nullable) = nullability {
                existing.nullable = nullable;
            }
            return Ok(());
        }
        p.expect_word("DROP")?;
        p.expect_word("COLUMN")?;
        let column = p.ident()?;
        p.done()?;
        let t = state.table_mut(&table)?;
        let before = t.columns.len();
        t.columns.retain(|c| c.name != column);
        if t.columns.len() == before {
            return Err(ora(904, "invalid identifier"));
        }
        t.primary_key.retain(|k| k != &column);
        state
            .indexes
            .retain(|i| !(i.table == table && i.columns.contains(&column)));
        return Ok(());
    }

    p.expect_word("DROP")?;
    if p.word("TABLE") {
        let table = p.ident()?;
        p.word("CASCADE");
        p.word("CONSTRAINTS");
        p.done()?;
        state.table_mut(&table)?;
        state.tables.retain(|t| t.name != table);
        state.indexes.retain(|i| i.table != table);
        state.triggers.retain(|t| t.table != table);
        return Ok(());
    }
    if p.word("INDEX") {
        let name = p.ident()?;
        p.done()?;
        let before = state.indexes.len();
        state.indexes.retain(|i| i.name != name);
        if state.indexes.len() == before {
            return Err(ora(1418, "specified index does not exist"));
        }
        return Ok(());
    }
    if p.word("SEQUENCE") {
        let name = p.ident()?;
        p.done()?;
        let before = state.sequences.len();
        state.sequences.retain(|s| s != &name);
        if state.sequences.len() == before {
            return Err(ora(2289, "sequence does not exist"));
        }
        return Ok(());
    }
    p.expect_word("TRIGGER")?;
    let name = p.ident()?;
    p.done()?;
    let before = state.triggers.len();
    state.triggers.retain(|t| t.name != name);
    if state.triggers.len() == before {
        return Err(ora(4080, "trigger does not exist"));
    }
    Ok(())
}

fn create_table(state: &mut State, p: &mut Parser<'_>) -> Result<()> {
    let name = p.ident()?;
    p.expect_sym('(')?;
    let mut table = MemTable {
        name: name.clone(),
        columns: Vec::new(),
        primary_key: Vec::new(),
    };
    let mut pk_name = None;
    loop {
        if p.word("CONSTRAINT") {
            pk_name = Some(p.ident()?);
            p.expect_word("PRIMARY")?;
            p.expect_word("KEY")?;
            table.primary_key = p.ident_list()?;
        } else {
            let (column, _) = p.column_def()?;
            if table.columns.iter().any(|c| c.name == column.name) {
                return Err(ora(957, "duplicate column name"));
            }
            table.columns.push(column);
        }
        if p.sym(')') {
            break;
        }
        p.expect_sym(',')?;
    }
    p.done()?;

    if state.name_in_use(&name) {
        return Err(ora(955, "name is already used by an existing object"));
    }
    if let Some(pk_name) = pk_name {
        if state.name_in_use(&pk_name) {
            return Err(ora(955, "name is already used by an existing object"));
        }
        state.indexes.push(MemIndex {
            name: pk_name,
            table: name.clone(),
            unique: true,
            columns: table.primary_key.clone(),
        });
    }
    state.tables.push(table);
    Ok(())
}

fn create_trigger(state: &mut State, p: &mut Parser<'_>, sql: &str) -> Result<()> {
    let name = p.ident()?;
    p.expect_word("BEFORE")?;
    p.expect_word("INSERT")?;
    p.expect_word("ON")?;
    let table = p.ident()?;
    if state.table(&table).is_none() {
        return Err(ora(942, "table or view does not exist"));
    }
    if state.triggers.iter().any(|t| t.name == name) {
        return Err(ora(4081, "trigger already exists"));
    }
    let body = sql
        .find("BEGIN")
        .map(|idx| sql[idx..].to_string())
        .unwrap_or_default();
    state.triggers.push(MemTrigger { name, table, body });
    Ok(())
}

#[async_trait]
impl QueryEngine for MemoryOracle {
    async fn query(&self, sql: &str, params: Params<'_>) -> Result<Vec<Row>> {
        let log = {
            let mut state = self.state();
            state.calls += 1;
            if state.closed {
                return Err(SchemaError::Closed);
            }
            state.log.clone()
        };
        if let Some(log) = log {
            log(sql);
        }
        self.state().answer(sql, params)
    }

    async fn execute_non_query(&self, sql: &str) -> Result<u64> {
        let log = {
            let mut state = self.state();
            state.calls += 1;
            if state.closed {
                return Err(SchemaError::Closed);
            }
            state.statements.push(sql.to_string());
            state.log.clone()
        };
        if let Some(log) = log {
            log(sql);
        }

        let mut state = self.state();
        if state.fail_patterns.iter().any(|p| sql.contains(p.as_str())) {
            return Err(ora(1031, "insufficient privileges"));
        }
        apply_ddl(&mut state, sql)?;
        Ok(1)
    }

    async fn begin_transaction(&self) -> Result<()> {
        let mut state = self.state();
        state.calls += 1;
        state.transactions.push("begin");
        Ok(())
    }

    async fn commit(&self) -> Result<()> {
        let mut state = self.state();
        state.calls += 1;
        state.transactions.push("commit");
        if state.fail_commit {
            return Err(ora(3113, "end-of-file on communication channel"));
        }
        Ok(())
    }

    async fn rollback(&self) -> Result<()> {
        let mut state = self.state();
        state.calls += 1;
        state.transactions.push("rollback");
        Ok(())
    }

    fn set_log(&self, log: Option<SqlLog>) {
        self.state().log = log;
    }

    async fn close(&self) -> Result<()> {
        let mut state = self.state();
        state.close_calls += 1;
        state.closed = true;
        Ok(())
    }
}
