//! Prompt Builder: renders a `PortfolioRecord` into the fixed system prompt sent
//! ahead of every conversation. Built once at startup and shared read-only.

use std::fmt::{self, Write};

use crate::portfolio::PortfolioRecord;

const BEHAVIOR_GUIDELINES: &[&str] = &[
    "Be professional, confident, and polite",
    "Answer questions clearly and concisely",
    "Explain projects in simple terms that non-technical people can understand",
    "When asked about skills, mention specific technologies and real projects",
    "When asked about experience, highlight achievements and learning outcomes",
    "Encourage contact naturally without being pushy",
    "NEVER make up or hallucinate information not in the portfolio",
    "If asked about something not in the portfolio, politely say you don't have that information",
    "Use first-person when describing the portfolio owner's work (\"I developed...\", \"My experience includes...\")",
    "Be enthusiastic about the owner's field of work",
    "If asked unrelated questions (weather, jokes, general knowledge), politely redirect to portfolio topics",
];

/// System prompt derived from a portfolio record. Byte-identical for equal records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SystemPrompt(String);

impl SystemPrompt {
    pub fn build(record: &PortfolioRecord) -> Self {
        Self(render(record))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SystemPrompt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

fn heading(out: &mut String, title: &str) {
    out.push_str(title);
    out.push('\n');
    out.push_str(&"=".repeat(title.len()));
    out.push_str("\n\n");
}

// `write!` into a String cannot fail; results are discarded.
fn render(r: &PortfolioRecord) -> String {
    let mut out = String::with_capacity(4096);

    let _ = writeln!(
        out,
        "You are an intelligent AI assistant representing {}, {}.\n",
        r.name, r.role
    );

    heading(&mut out, "PORTFOLIO INFORMATION:");
    let _ = writeln!(out, "NAME: {}", r.name);
    let _ = writeln!(out, "ROLE: {}", r.role);
    let _ = writeln!(out, "TAGLINE: {}", r.tagline);
    let _ = writeln!(out, "LOCATION: {}\n", r.location);

    let _ = writeln!(out, "ABOUT:\n{}\n", r.about);

    out.push_str("CONTACT:\n");
    let _ = writeln!(out, "- Email: {}", r.contact.email);
    let _ = writeln!(out, "- LinkedIn: {}", r.contact.linkedin);
    let _ = writeln!(out, "- Location: {}\n", r.contact.location);

    out.push_str("SKILLS:\n");
    for (label, items) in r.skills.groups() {
        if !items.is_empty() {
            let _ = writeln!(out, "- {}: {}", label, items.join(", "));
        }
    }
    out.push('\n');

    if !r.experience.is_empty() {
        out.push_str("EXPERIENCE:\n");
        for (i, e) in r.experience.iter().enumerate() {
            let _ = write!(out, "{}. {} at {} ({})", i + 1, e.title, e.company, e.duration);
            if let Some(loc) = &e.location {
                let _ = write!(out, ", {}", loc);
            }
            out.push('\n');
            for line in &e.description {
                let _ = writeln!(out, "   - {}", line);
            }
        }
        out.push('\n');
    }

    if !r.projects.is_empty() {
        out.push_str("KEY PROJECTS:\n");
        for (i, p) in r.projects.iter().enumerate() {
            let _ = writeln!(out, "{}. {}: {}", i + 1, p.name, p.description);
            if !p.technologies.is_empty() {
                let _ = writeln!(out, "   - Technologies: {}", p.technologies.join(", "));
            }
            let _ = writeln!(out, "   - Achievement: {}", p.achievement);
            let _ = writeln!(out, "   - Impact: {}", p.impact);
        }
        out.push('\n');
    }

    out.push_str("EDUCATION:\n");
    let _ = writeln!(out, "{} in {}", r.education.degree, r.education.major);
    let _ = writeln!(out, "{} ({})\n", r.education.institution, r.education.duration);

    if !r.certifications.is_empty() {
        let _ = writeln!(out, "CERTIFICATIONS:\n{}\n", r.certifications.join(", "));
    }

    if !r.publications.is_empty() {
        out.push_str("PUBLICATIONS:\n");
        for p in &r.publications {
            let _ = writeln!(out, "- {}", p);
        }
        out.push('\n');
    }

    heading(&mut out, "BEHAVIOR GUIDELINES:");
    for (i, g) in BEHAVIOR_GUIDELINES.iter().enumerate() {
        let _ = writeln!(out, "{}. {}", i + 1, g);
    }
    out.push('\n');

    if !r.example_responses.is_empty() {
        heading(&mut out, "EXAMPLE RESPONSES:");
        for ex in &r.example_responses {
            let _ = writeln!(out, "Q: \"{}\"", ex.question);
            let _ = writeln!(out, "A: \"{}\"\n", ex.answer);
        }
    }

    let _ = write!(
        out,
        "Remember: You represent {}. Keep responses focused, accurate, and engaging! \
         For anything beyond this portfolio, invite the visitor to reach out at {}.",
        r.name, r.contact.email
    );

    out
}
