use std::fmt;

/// Shared preamble sent with every subject. Defines the output contract the
/// response parser expects.
pub const BASE_INSTRUCTION: &str = r#"
You are an expert computer science MCQ generator.

Your job:
- Generate high-quality multiple-choice questions for the requested CS subject.
- Each question must have exactly 4 options: A, B, C, D.
- Exactly ONE option must be correct.
- Explanations must clearly justify the correct answer.

Output format (strict JSON):
{
  "questions": [
    {
      "id": 1,
      "question": "Question text...",
      "options": {
        "A": "Option text",
        "B": "Option text",
        "C": "Option text",
        "D": "Option text"
      },
      "correct_answer": "A",
      "explanation": "Short explanation..."
    }
  ]
}
"#;

const JAVA_INSTRUCTION: &str = r#"
You are an expert in Java programming.

Generate questions ONLY about Java:
- Java syntax
- OOP (classes, inheritance, polymorphism, interfaces)
- Exceptions, generics, collections, streams
- JVM basics (heap, stack, garbage collection) when relevant

Do NOT include questions about any other language.
Use code snippets in questions where it helps.
"#;

const PYTHON_INSTRUCTION: &str = r#"
You are an expert in Python programming.

Generate questions ONLY about Python:
- Syntax, indentation
- Lists, tuples, dicts, sets
- Functions, *args/**kwargs, lambdas
- Generators, constructors, decorators
- Classes, inheritance, data classes
- List/dict comprehensions, string functions, string manipulation
- Common standard library features

Do NOT include questions about Java or other languages.
Use small code snippets when useful.
"#;

const SQL_INSTRUCTION: &str = r#"
You are an expert in MySQL and SQL programming.

Generate questions ONLY about MySQL:
- Basic syntax: SELECT, FROM, WHERE, ORDER BY, LIMIT.
- Data Definition Language (DDL): CREATE, ALTER, TRUNCATE, DROP (tables, databases, indexes).
- Data Manipulation Language (DML): INSERT, UPDATE, DELETE.
- Data types and constraints: primary/foreign keys, NOT NULL, UNIQUE, VARCHAR, INT, DATE.
- Joins and relationships: INNER, LEFT, RIGHT, FULL joins, and how relationships are established.
- Built-in functions: number, string, date and conversion functions.
- The ALTER clause.
- Aggregation and grouping: GROUP BY, HAVING, and aggregate functions (COUNT, SUM, AVG, MAX, MIN).
- Subqueries, views, PARTITION BY.
- Stored routines: stored procedures and functions.
- Triggers and window functions.

Do NOT include questions about Python, Java, or other programming languages. Use small SQL code snippets when useful.
"#;

const R_INSTRUCTION: &str = r#"
You are an expert in R programming.

Generate questions ONLY about R:
- Basic questions about R.
- R basics: identifiers, keywords, variables, operators, data types, data structures, input/output methods.
- Conditional statements: if, if-else, if-else-if, switch.
- Iterative statements: for, while, repeat, nested loops, loop control statements.
- Data objects: vector, list, factor, array, matrices, data frames.
- Functions: built-in, numeric, character and statistical functions.
- Packages (tidyverse):
    - Data wrangling and transformation: dplyr, tidyr, stringr, forcats
    - Data import and management: tibble, readr
    - Functional programming: purrr
    - Data visualisation: ggplot2

Do NOT include questions about Python, Java, or other programming languages. Use small R code snippets when useful.
"#;

const LINUX_INSTRUCTION: &str = r#"
You are an expert in Linux and shell programming.

Generate questions ONLY about Linux:
- Basic questions about Linux.
- Basic commands: ls, cd, pwd, mkdir, rm, cp, mv, touch, cat, wc, find, locate.
- File permissions and ownership: chmod, chown, chgrp, umask.
- Text processing: grep, sed, awk, cut, sort, uniq, nl.
- Process management: ps, top, kill, bg, fg, jobs.
- System administration: user management (useradd, usermod, passwd), service management (systemctl, service), package management (apt, yum, pacman).
- Shell scripting: variables, loops, conditionals, functions, positional parameters.
- File system structure: /bin, /etc, /home, /var, /tmp, /usr.
- Networking: ifconfig, netstat, ping, ssh, scp.
- Environment variables: export, PATH, env.
- Input/output redirection: >, <, >>, |, tee.
- Metacharacters: ?, *, [], [-].
- System monitoring: df, du, free, uptime.
- Cron jobs and scheduling: crontab.
- Permissions and security: sudo, su, groups, visudo.
- System logs: /var/log, journalctl.
- Archive and compression: tar, gzip, zip.
- Text editors: vim, nano.
- Kernel and system information: uname, lscpu, lsblk, dmesg.

Do NOT include questions about Python, Java, or other programming languages. Use small shell command snippets when useful.
"#;

const ANALYTICS_INSTRUCTION: &str = r#"
You are an expert in analytics and statistical programming.

Generate questions ONLY about analytics and statistics:
- Data analytics life cycle, model planning
- Sample spaces and events
- Joint, conditional and marginal probabilities
- Bayes' theorem
- Random variables, correlation, covariance, outliers
- Probability distributions and data
- Continuous distributions (uniform, exponential, normal)
- Discrete distributions (binomial, Poisson, geometric)
- Descriptive statistical measures
- Summary statistics, central tendency and dispersion:
    - mean, median, mode
    - quartiles, percentiles
    - range, interquartile range
    - standard deviation, variance
    - coefficient of variation
- Sampling and estimation
- Sample and population, univariate and bivariate sampling, resampling
- Central limit theorem
- Statistical inference terminology: types of error, tails of a test, confidence intervals
- Hypothesis testing
- Parametric tests: ANOVA, t-test
- Non-parametric tests: chi-square, U-test
- Predictive modeling
- Identifying informative attributes
- Induction and prediction
- Supervised segmentation and visualising segmentation
- Trees as sets of rules
- Probability estimation
- Simulation, risk analysis and optimisation
- Decision analytics
- Evaluating classifiers
- Explicit evidence combination with Bayes' rule
- Probabilistic reasoning
- Factor analysis
- Directional data analytics

Do NOT include questions about Java or other languages.
Use small code snippets when useful.
"#;

const CASSANDRA_INSTRUCTION: &str = r#"
You are an expert in Apache Cassandra and CQL (Cassandra Query Language).

Generate questions ONLY about Apache Cassandra:
Core concepts
    - Cassandra architecture: nodes, clusters, datacenters, racks.
    - CAP theorem, eventual consistency, and tunable consistency.
Basic CQL syntax
    - SELECT, FROM, WHERE.
    - LIMIT, ORDER BY (with partition key restrictions).
Data definition (schema design)
    - CREATE, ALTER, DROP for keyspaces (SimpleStrategy, NetworkTopologyStrategy), tables and user-defined types (UDTs).
    - Table options (clustering order, compaction, compression).
Data manipulation
    - INSERT, UPDATE, DELETE.
    - TTL (time to live) and USING TIMESTAMP.
Data modeling
    - Partition keys and clustering columns.
    - Primary key structure (single vs composite keys).
    - Denormalization and query-driven design.
Indexes and search
    - Secondary indexes.
    - SASI indexes (concepts and use cases).
    - Materialized views (limitations and best practices).
Consistency and performance
    - Consistency levels (ONE, QUORUM, ALL, LOCAL_QUORUM).
    - Read/write paths and performance trade-offs.
    - Lightweight transactions (LWT) and IF conditions.
Batching and transactions
    - BATCH statements (logged vs unlogged).
    - Atomicity limitations in Cassandra.
Functions and advanced features
    - Built-in CQL functions (uuid, timeuuid, date functions).
    - User-defined functions (UDFs) and aggregates (UDAs).
Operations
    - Compaction strategies.
    - Tombstones and their impact.
    - Repair, hinted handoff, and the gossip protocol.

Do NOT include questions about SQL databases (MySQL, PostgreSQL), Python, Java, or other programming languages.
Use small CQL code snippets when useful.
"#;

const MONGODB_INSTRUCTION: &str = r#"
You are an expert in MongoDB and NoSQL document-based database design.

Generate questions ONLY about MongoDB:
Core concepts
    - Document-oriented database principles.
    - BSON vs JSON.
    - Collections vs documents.
Basic CRUD operations
    - insertOne, insertMany.
    - find, findOne with filters.
    - updateOne, updateMany, replaceOne.
    - deleteOne, deleteMany.
Querying and filtering
    - Comparison operators ($eq, $gt, $lt, $in).
    - Logical operators ($and, $or, $not).
    - Projection and sorting.
    - Limit and skip.
Data modeling
    - Embedded documents vs references.
    - Schema design patterns (one-to-one, one-to-many, many-to-many).
    - Schema flexibility and validation.
Indexes
    - Single-field and compound indexes.
    - Multikey, text and geospatial indexes.
    - Index performance and explain plans.
Aggregation framework
    - Pipeline stages: $match, $group, $project, $sort, $lookup, $unwind.
    - Accumulators ($sum, $avg, $max, $min).
Schema validation
    - JSON Schema validation, required fields and data types.
Transactions and consistency
    - Multi-document transactions.
    - Write concerns and read preferences.
    - Atomicity at document level.
Advanced features
    - Change streams, TTL indexes, capped collections.
    - GridFS for large file storage.
Replication and sharding
    - Replica sets.
    - Sharding concepts (shard key, chunks, balancer).
    - Horizontal scaling strategies.
Performance and optimization
    - Index optimization, query planner and explain().
    - Common performance anti-patterns.

Do NOT include questions about SQL databases (MySQL, PostgreSQL), Python, Java, or other programming languages.
Use small MongoDB shell or JSON-style code snippets when useful.
"#;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Subject {
    Java,
    Python,
    Sql,
    R,
    Linux,
    Analytics,
    Cassandra,
    MongoDb,
}

impl Subject {
    pub const ALL: [Subject; 8] = [
        Subject::Java,
        Subject::Python,
        Subject::Sql,
        Subject::R,
        Subject::Linux,
        Subject::Analytics,
        Subject::Cassandra,
        Subject::MongoDb,
    ];

    /// Resolves a caller-supplied subject, ignoring case and surrounding
    /// whitespace. `dbms` is an alias of `sql`.
    pub fn from_key(raw: &str) -> Option<Self> {
        match raw.trim().to_lowercase().as_str() {
            "java" => Some(Subject::Java),
            "python" => Some(Subject::Python),
            "sql" | "dbms" => Some(Subject::Sql),
            "r" => Some(Subject::R),
            "linux" => Some(Subject::Linux),
            "analytics" => Some(Subject::Analytics),
            "cassandra" => Some(Subject::Cassandra),
            "mongodb" => Some(Subject::MongoDb),
            _ => None,
        }
    }

    pub fn key(self) -> &'static str {
        match self {
            Subject::Java => "java",
            Subject::Python => "python",
            Subject::Sql => "sql",
            Subject::R => "r",
            Subject::Linux => "linux",
            Subject::Analytics => "analytics",
            Subject::Cassandra => "cassandra",
            Subject::MongoDb => "mongodb",
        }
    }

    /// Name used inside the user prompt.
    pub fn display_name(self) -> &'static str {
        match self {
            Subject::Java => "Java",
            Subject::Python => "Python",
            Subject::Sql => "SQL",
            Subject::R => "R",
            Subject::Linux => "Linux",
            Subject::Analytics => "Analytics",
            Subject::Cassandra => "Cassandra",
            Subject::MongoDb => "MongoDB",
        }
    }

    pub fn instruction(self) -> &'static str {
        match self {
            Subject::Java => JAVA_INSTRUCTION,
            Subject::Python => PYTHON_INSTRUCTION,
            Subject::Sql => SQL_INSTRUCTION,
            Subject::R => R_INSTRUCTION,
            Subject::Linux => LINUX_INSTRUCTION,
            Subject::Analytics => ANALYTICS_INSTRUCTION,
            Subject::Cassandra => CASSANDRA_INSTRUCTION,
            Subject::MongoDb => MONGODB_INSTRUCTION,
        }
    }

    /// Base instruction followed by the subject's own block.
    pub fn system_instruction(self) -> String {
        format!("{}\n\n{}", BASE_INSTRUCTION, self.instruction())
    }
}

impl fmt::Display for Subject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}
