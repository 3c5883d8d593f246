//! Bayesian Interchange Format (BIF) network parser.
//!
//! Reads the subset of BIF that describes discrete networks:
//!
//! ```text
//! network unknown {
//! }
//! variable A {
//!   type discrete [ 2 ] { yes, no };
//! }
//! probability ( A ) {
//!   table 0.01, 0.99;
//! }
//! probability ( C | A ) {
//!   (yes) 0.05, 0.95;
//!   (no) 0.01, 0.99;
//! }
//! ```
//!
//! The result is the full joint table of the network together with its
//! edges, which can be turned into a synthetic dataset and a [`Dag`].

use std::collections::BTreeMap;

use causetable_engine::Dag;
use causetable_foundation::{Error, Result, Value};
use causetable_storage::{Dataset, ProbabilityTable};

/// Parser settings.
#[derive(Clone, Debug, PartialEq)]
pub struct BifOptions {
    /// Allowed distance from 1 before a probability row is reported.
    pub sum_tolerance: f64,
}

impl Default for BifOptions {
    fn default() -> Self {
        Self {
            sum_tolerance: 0.01,
        }
    }
}

impl BifOptions {
    /// Builder method to set the sum tolerance.
    #[must_use]
    pub fn with_sum_tolerance(mut self, tolerance: f64) -> Self {
        self.sum_tolerance = tolerance;
        self
    }
}

/// A declared discrete variable.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BifVariable {
    /// Variable name.
    pub name: String,
    /// States in declaration order.
    pub states: Vec<String>,
}

/// A prior table: `probability ( X ) { table ...; }`.
#[derive(Clone, Debug, PartialEq)]
pub struct UnconditionalProbability {
    /// The variable.
    pub variable: String,
    /// One probability per state.
    pub probabilities: Vec<f64>,
}

/// One row of a conditional table: `(k1, k2) p1, p2;`.
#[derive(Clone, Debug, PartialEq)]
pub struct ConditionalRow {
    /// Values of the conditioning variables.
    pub keys: Vec<String>,
    /// One probability per state of the conditioned variable.
    pub probabilities: Vec<f64>,
}

/// A conditional table: `probability ( X | A, B ) { ... }`.
#[derive(Clone, Debug, PartialEq)]
pub struct ConditionalProbability {
    /// The conditioned variable.
    pub variable: String,
    /// The conditioning variables, in declaration order.
    pub conditionals: Vec<String>,
    /// Table rows.
    pub rows: Vec<ConditionalRow>,
}

/// A parsed network.
#[derive(Clone, Debug)]
pub struct BifNetwork {
    /// The declared network type.
    pub network_type: String,
    /// Declared variables.
    pub variables: Vec<BifVariable>,
    /// Joint distribution over every variable.
    pub table: ProbabilityTable,
    /// `(parent, child)` pairs.
    pub edges: Vec<(String, String)>,
    /// Non-fatal problems found while parsing.
    pub warnings: Vec<String>,
}

impl BifNetwork {
    /// Expands the joint table into exactly `rows` observations.
    ///
    /// Rows are apportioned by largest remainder: every combination first
    /// gets `floor(prob * rows)` copies, then the leftover observations go
    /// one each to the combinations with the largest fractional parts
    /// (earlier rows win ties). Zero-mass combinations never appear.
    ///
    /// # Errors
    ///
    /// Only fails on internal inconsistencies.
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        clippy::cast_precision_loss
    )]
    pub fn to_dataset(&self, rows: usize) -> Result<Dataset> {
        let total = self.table.total();
        let shares: Vec<f64> = self
            .table
            .rows()
            .iter()
            .map(|row| if total > 0.0 { row.prob / total * rows as f64 } else { 0.0 })
            .collect();
        let mut copies: Vec<usize> = shares.iter().map(|s| s.floor() as usize).collect();

        let assigned: usize = copies.iter().sum();
        let mut order: Vec<usize> = (0..shares.len()).filter(|&i| shares[i] > 0.0).collect();
        order.sort_by(|&a, &b| {
            let ra = shares[a] - shares[a].floor();
            let rb = shares[b] - shares[b].floor();
            rb.total_cmp(&ra)
        });
        for &i in order.iter().take(rows.saturating_sub(assigned)) {
            copies[i] += 1;
        }

        let data = self
            .table
            .rows()
            .iter()
            .zip(copies)
            .flat_map(|(row, n)| std::iter::repeat_n(row.values.clone(), n));
        Dataset::from_rows(self.table.columns(), data)
    }

    /// Builds a graph with this network's edges over a synthetic dataset.
    ///
    /// # Errors
    ///
    /// Returns an error if an edge is rejected by the graph.
    pub fn to_dag(&self, rows: usize) -> Result<Dag> {
        Dag::new(self.to_dataset(rows)?)
            .add_edges(self.edges.iter().map(|(s, t)| (s.as_str(), t.as_str())))
    }
}

// =============================================================================
// Blocks
// =============================================================================

/// A top-level `keyword header { body }` statement.
struct Block {
    keyword: String,
    header: String,
    body: String,
    line: usize,
}

fn line_at(text: &str, offset: usize) -> usize {
    text[..offset].matches('\n').count() + 1
}

fn strip_comments(text: &str) -> String {
    text.lines()
        .map(|l| l.split_once("//").map_or(l, |(code, _)| code))
        .collect::<Vec<_>>()
        .join("\n")
}

fn blocks(text: &str) -> Result<Vec<Block>> {
    let text = strip_comments(text);
    let mut out = Vec::new();
    let mut depth = 0usize;
    let mut head_start = 0;
    let mut body_start = 0;

    for (i, c) in text.char_indices() {
        match c {
            '{' => {
                if depth == 0 {
                    body_start = i + 1;
                }
                depth += 1;
            }
            '}' => {
                if depth == 0 {
                    return Err(Error::parse("unmatched '}'", line_at(&text, i)));
                }
                depth -= 1;
                if depth == 0 {
                    let raw = &text[head_start..body_start - 1];
                    let lead = raw.len() - raw.trim_start().len();
                    let head = raw.trim();
                    let (keyword, header) = head.split_once(char::is_whitespace).unwrap_or((head, ""));
                    out.push(Block {
                        keyword: keyword.to_string(),
                        header: header.trim().to_string(),
                        body: text[body_start..i].to_string(),
                        line: line_at(&text, head_start + lead),
                    });
                    head_start = i + 1;
                }
            }
            _ => {}
        }
    }

    if depth != 0 {
        return Err(Error::parse("unclosed '{'", line_at(&text, text.len())));
    }
    Ok(out)
}

/// Splits a body into trimmed, non-empty `;`-terminated statements.
fn statements(body: &str) -> impl Iterator<Item = &str> {
    body.split(';').map(str::trim).filter(|s| !s.is_empty())
}

fn numbers(text: &str, line: usize) -> Result<Vec<f64>> {
    text.split(',')
        .map(|p| {
            p.trim()
                .parse::<f64>()
                .map_err(|_| Error::parse(format!("invalid probability '{}'", p.trim()), line))
        })
        .collect()
}

fn between(text: &str, open: char, close: char) -> Option<(&str, &str)> {
    let start = text.find(open)?;
    let end = start + text[start..].find(close)?;
    Some((&text[start + open.len_utf8()..end], &text[end + close.len_utf8()..]))
}

fn split_list(text: &str) -> Vec<String> {
    text.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

// =============================================================================
// Sections
// =============================================================================

/// Returns the declared network type.
///
/// # Errors
///
/// Returns a parse error if there is no `network` block.
pub fn parse_network_type(text: &str) -> Result<String> {
    blocks(text)?
        .into_iter()
        .find(|b| b.keyword == "network")
        .map(|b| b.header)
        .ok_or_else(|| Error::parse("missing network block", 1))
}

/// Returns the declared variables in file order.
///
/// # Errors
///
/// Returns a parse error if a variable is not discrete or its declaration
/// is malformed.
pub fn parse_variables(text: &str) -> Result<Vec<BifVariable>> {
    blocks(text)?
        .into_iter()
        .filter(|b| b.keyword == "variable")
        .map(|b| parse_variable(&b))
        .collect()
}

fn parse_variable(block: &Block) -> Result<BifVariable> {
    let name = block.header.clone();
    if name.is_empty() {
        return Err(Error::parse("variable without a name", block.line));
    }
    let decl = statements(&block.body)
        .find(|s| s.starts_with("type"))
        .ok_or_else(|| Error::parse(format!("variable {name} has no type"), block.line))?;
    let rest = decl["type".len()..].trim_start();
    let (kind, rest) = rest.split_once(char::is_whitespace).unwrap_or((rest, ""));
    if kind != "discrete" {
        return Err(Error::parse(
            format!("variable {name} is {kind}; only discrete variables are supported"),
            block.line,
        ));
    }

    let (states, _) = between(rest, '{', '}')
        .ok_or_else(|| Error::parse(format!("variable {name} lists no states"), block.line))?;
    let states = split_list(states);
    if let Some((count, _)) = between(rest, '[', ']') {
        let count: usize = count
            .trim()
            .parse()
            .map_err(|_| Error::parse(format!("invalid state count for {name}"), block.line))?;
        if count != states.len() {
            return Err(Error::parse(
                format!("variable {name} declares {count} states but lists {}", states.len()),
                block.line,
            ));
        }
    }
    tracing::trace!(variable = %name, states = states.len(), "bif variable");
    Ok(BifVariable { name, states })
}

/// Splits `( X | A, B )` into `X` and `[A, B]`.
fn probability_header(block: &Block) -> Result<(String, Vec<String>)> {
    let (inner, _) = between(&block.header, '(', ')')
        .ok_or_else(|| Error::parse("probability header must be parenthesized", block.line))?;
    let (variable, conditionals) = match inner.split_once('|') {
        Some((v, c)) => (v.trim(), split_list(c)),
        None => (inner.trim(), Vec::new()),
    };
    if variable.is_empty() {
        return Err(Error::parse("probability without a variable", block.line));
    }
    Ok((variable.to_string(), conditionals))
}

/// Returns every prior table in file order.
///
/// # Errors
///
/// Returns a parse error if a table is malformed.
pub fn parse_unconditional_probabilities(text: &str) -> Result<Vec<UnconditionalProbability>> {
    let mut out = Vec::new();
    for block in blocks(text)?.iter().filter(|b| b.keyword == "probability") {
        let (variable, conditionals) = probability_header(block)?;
        if !conditionals.is_empty() {
            continue;
        }
        let table = statements(&block.body)
            .find_map(|s| s.strip_prefix("table"))
            .ok_or_else(|| Error::parse(format!("prior of {variable} has no table"), block.line))?;
        out.push(UnconditionalProbability {
            variable,
            probabilities: numbers(table, block.line)?,
        });
    }
    Ok(out)
}

/// Returns every conditional table in file order.
///
/// # Errors
///
/// Returns a parse error if a row is malformed.
pub fn parse_conditional_probabilities(text: &str) -> Result<Vec<ConditionalProbability>> {
    let mut out = Vec::new();
    for block in blocks(text)?.iter().filter(|b| b.keyword == "probability") {
        let (variable, conditionals) = probability_header(block)?;
        if conditionals.is_empty() {
            continue;
        }
        let mut rows = Vec::new();
        for statement in statements(&block.body) {
            let (keys, probabilities) = statement
                .strip_prefix('(')
                .and_then(|s| s.split_once(')'))
                .ok_or_else(|| {
                    Error::parse(
                        format!("unsupported entry in table of {variable}: {statement}"),
                        block.line,
                    )
                })?;
            let keys = split_list(keys);
            if keys.len() != conditionals.len() {
                return Err(Error::parse(
                    format!(
                        "row of {variable} has {} keys for {} conditionals",
                        keys.len(),
                        conditionals.len()
                    ),
                    block.line,
                ));
            }
            rows.push(ConditionalRow {
                keys,
                probabilities: numbers(probabilities, block.line)?,
            });
        }
        out.push(ConditionalProbability {
            variable,
            conditionals,
            rows,
        });
    }
    Ok(out)
}

// =============================================================================
// Network
// =============================================================================

/// Parses a network with default options.
///
/// # Errors
///
/// See [`parse_with`].
pub fn parse(text: &str) -> Result<BifNetwork> {
    parse_with(text, &BifOptions::default())
}

/// Parses a network into its joint table and edges.
///
/// Priors are combined first, then conditional tables in dependency order.
///
/// # Errors
///
/// Returns a parse error if:
/// - A section is malformed
/// - A table names an undeclared variable or has the wrong width
/// - A conditional table depends on variables that never get a table
pub fn parse_with(text: &str, options: &BifOptions) -> Result<BifNetwork> {
    let network_type = parse_network_type(text)?;
    let variables = parse_variables(text)?;
    let mut warnings = Vec::new();

    if network_type != "unknown" {
        warn(&mut warnings, format!("network type '{network_type}' is not interpreted"));
    }

    let states: BTreeMap<&str, &[String]> = variables
        .iter()
        .map(|v| (v.name.as_str(), v.states.as_slice()))
        .collect();
    let states_of = |name: &str| {
        states
            .get(name)
            .copied()
            .ok_or_else(|| Error::parse(format!("undeclared variable {name}"), 1))
    };

    let mut table = ProbabilityTable::unit();
    for prior in parse_unconditional_probabilities(text)? {
        let domain = states_of(&prior.variable)?;
        check_width(&prior.variable, domain, &prior.probabilities)?;
        check_sum(&mut warnings, &prior.variable, &prior.probabilities, options);
        let rows = domain
            .iter()
            .zip(&prior.probabilities)
            .map(|(s, p)| (vec![Value::parse_token(s)], *p));
        table = table.join(&ProbabilityTable::from_rows([prior.variable.as_str()], rows)?)?;
    }

    let mut pending = parse_conditional_probabilities(text)?;
    let mut edges = Vec::new();
    while !pending.is_empty() {
        let Some(idx) = pending
            .iter()
            .position(|c| c.conditionals.iter().all(|p| table.has_column(p)))
        else {
            let names: Vec<&str> = pending.iter().map(|c| c.variable.as_str()).collect();
            return Err(Error::parse(
                format!("conditional tables with unresolved parents: {}", names.join(", ")),
                1,
            ));
        };
        let cond = pending.remove(idx);
        let domain = states_of(&cond.variable)?;
        for parent in &cond.conditionals {
            states_of(parent)?;
        }

        let mut rows = Vec::new();
        for (n, row) in cond.rows.iter().enumerate() {
            check_width(&cond.variable, domain, &row.probabilities)?;
            let label = format!("{} | {} (row {})", cond.variable, cond.conditionals.join(", "), n + 1);
            check_sum(&mut warnings, &label, &row.probabilities, options);
            let keys: Vec<Value> = row.keys.iter().map(|k| Value::parse_token(k)).collect();
            for (state, p) in domain.iter().zip(&row.probabilities) {
                let mut values = keys.clone();
                values.push(Value::parse_token(state));
                rows.push((values, *p));
            }
        }
        let mut columns: Vec<&str> = cond.conditionals.iter().map(String::as_str).collect();
        columns.push(&cond.variable);
        table = table.join(&ProbabilityTable::from_rows(columns, rows)?)?;
        edges.extend(
            cond.conditionals
                .iter()
                .map(|p| (p.clone(), cond.variable.clone())),
        );
    }

    tracing::debug!(
        variables = variables.len(),
        edges = edges.len(),
        rows = table.len(),
        "bif network parsed"
    );
    Ok(BifNetwork {
        network_type,
        variables,
        table,
        edges,
        warnings,
    })
}

fn check_width(variable: &str, domain: &[String], probabilities: &[f64]) -> Result<()> {
    if domain.len() == probabilities.len() {
        return Ok(());
    }
    Err(Error::parse(
        format!(
            "{variable} has {} states but {} probabilities",
            domain.len(),
            probabilities.len()
        ),
        1,
    ))
}

fn check_sum(warnings: &mut Vec<String>, label: &str, probabilities: &[f64], options: &BifOptions) {
    let total: f64 = probabilities.iter().sum();
    if (1.0 - total).abs() > options.sum_tolerance {
        warn(warnings, format!("{label} has probabilities summing to {total}"));
    }
}

fn warn(warnings: &mut Vec<String>, message: String) {
    tracing::warn!("bif: {message}");
    warnings.push(message);
}
