//! Template context built from a [`CvDocument`].
//!
//! [`RenderContext`] is what templates see. It mirrors the document's shape
//! but every text value has already been turned into a [`Fragment`], so the
//! composer can interpolate it without further escaping.
//!
//! # Field Treatment
//!
//! - Identity fields (names, titles, companies, dates, places) use [`escape`]
//! - Prose fields (tagline, summary, highlights, descriptions, metrics, tech
//!   items) use [`format_inline`] so `**bold**` works
//! - URLs use [`escape_url`]
//!
//! # Derived Values
//!
//! - `contacts`: the contact methods that are present, in a fixed order, each
//!   with display text and an optional link target
//! - `dates` on experience entries: `start -- end`, or whichever half is set
//!
//! Building the context is deterministic: lists keep source order and no
//! value depends on time or environment.

use serde::Serialize;

use crate::document::{Certification, CvDocument, Experience, Project, TechGroup, TextList};
use crate::error::{RenderError, Result};
use crate::escape::{allow_breaks, escape, escape_url, format_inline, EmphasisMode, Fragment};

/// The values handed to the root template.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RenderContext {
    pub name: Fragment,
    pub tagline: Fragment,
    pub summary: Fragment,
    pub email: Fragment,
    pub phone: Fragment,
    pub location: Fragment,
    pub website: Fragment,
    pub linkedin: Fragment,
    pub github: Fragment,
    pub contacts: Vec<ContactView>,
    pub experience: Vec<ExperienceView>,
    pub projects: Vec<ProjectView>,
    pub tech_stack: Vec<TechGroupView>,
    pub certifications: Vec<CertificationView>,
}

/// One entry of the contact line.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContactView {
    /// `email`, `phone`, `location`, `website`, `linkedin` or `github`.
    pub kind: &'static str,
    pub text: Fragment,
    /// Link target; empty when the entry is not a link.
    pub href: Fragment,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExperienceView {
    pub title: Fragment,
    pub company: Fragment,
    pub location: Fragment,
    pub dates: Fragment,
    pub highlights: Vec<Fragment>,
    pub tech: Vec<Fragment>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProjectView {
    pub name: Fragment,
    pub url: Fragment,
    /// Display form of the URL, scheme stripped.
    pub url_text: Fragment,
    pub description: Fragment,
    pub highlights: Vec<Fragment>,
    pub metrics: Vec<Fragment>,
    pub tech: Vec<Fragment>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TechGroupView {
    pub category: Fragment,
    pub items: Vec<Fragment>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CertificationView {
    pub name: Fragment,
    pub issuer: Fragment,
    pub date: Fragment,
    pub url: Fragment,
}

impl RenderContext {
    /// Converts a document into template-ready values.
    ///
    /// # Errors
    ///
    /// In [`EmphasisMode::Strict`], returns [`RenderError::UnbalancedEmphasis`]
    /// naming the first prose field with an unmatched `**`.
    pub fn build(doc: &CvDocument, mode: EmphasisMode) -> Result<Self> {
        let fmt = FieldFormatter { mode };

        Ok(Self {
            name: escape(doc.name.trim()),
            tagline: fmt.inline("tagline", &doc.tagline)?,
            summary: fmt.inline("summary", &doc.summary)?,
            email: escape(doc.email.trim()),
            phone: escape(doc.phone.trim()),
            location: escape(doc.location.trim()),
            website: escape(display_url(&doc.website)),
            linkedin: escape(doc.linkedin.trim()),
            github: escape(doc.github.trim()),
            contacts: contacts(doc),
            experience: doc
                .experience
                .iter()
                .enumerate()
                .map(|(i, job)| fmt.experience(i, job))
                .collect::<Result<_>>()?,
            projects: doc
                .projects
                .iter()
                .enumerate()
                .map(|(i, project)| fmt.project(i, project))
                .collect::<Result<_>>()?,
            tech_stack: doc
                .tech_stack
                .iter()
                .enumerate()
                .map(|(i, group)| fmt.tech_group(i, group))
                .collect::<Result<_>>()?,
            certifications: doc.certifications.iter().map(certification).collect(),
        })
    }
}

/// Applies the inline formatter and records field paths for error messages.
struct FieldFormatter {
    mode: EmphasisMode,
}

impl FieldFormatter {
    fn inline(&self, field: &str, raw: &str) -> Result<Fragment> {
        format_inline(raw.trim(), self.mode).map_err(|marker| RenderError::UnbalancedEmphasis {
            field: field.to_string(),
            position: marker.position,
        })
    }

    fn inline_all(&self, field: &str, items: &[String]) -> Result<Vec<Fragment>> {
        items
            .iter()
            .enumerate()
            .filter(|(_, item)| !item.trim().is_empty())
            .map(|(i, item)| self.inline(&format!("{}[{}]", field, i), item))
            .collect()
    }

    fn text_list(&self, field: &str, list: &TextList) -> Result<Vec<Fragment>> {
        list.items()
            .into_iter()
            .enumerate()
            .map(|(i, item)| {
                self.inline(&format!("{}[{}]", field, i), item)
                    .map(allow_breaks)
            })
            .collect()
    }

    fn experience(&self, index: usize, job: &Experience) -> Result<ExperienceView> {
        let path = format!("experience[{}]", index);
        Ok(ExperienceView {
            title: escape(job.title.trim()),
            company: escape(job.company.trim()),
            location: escape(job.location.trim()),
            dates: date_range(&job.start, &job.end),
            highlights: self.inline_all(&format!("{}.highlights", path), &job.highlights)?,
            tech: self.text_list(&format!("{}.tech", path), &job.tech)?,
        })
    }

    fn project(&self, index: usize, project: &Project) -> Result<ProjectView> {
        let path = format!("projects[{}]", index);
        Ok(ProjectView {
            name: escape(project.name.trim()),
            url: escape_url(&project.url),
            url_text: allow_breaks(escape(display_url(&project.url))),
            description: self.inline(&format!("{}.description", path), &project.description)?,
            highlights: self.inline_all(&format!("{}.highlights", path), &project.highlights)?,
            metrics: self.inline_all(&format!("{}.metrics", path), &project.metrics)?,
            tech: self.text_list(&format!("{}.tech", path), &project.tech)?,
        })
    }

    fn tech_group(&self, index: usize, group: &TechGroup) -> Result<TechGroupView> {
        Ok(TechGroupView {
            category: escape(group.category.trim()),
            items: self.text_list(&format!("tech_stack[{}].items", index), &group.items)?,
        })
    }
}

fn certification(cert: &Certification) -> CertificationView {
    CertificationView {
        name: escape(cert.name.trim()),
        issuer: escape(cert.issuer.trim()),
        date: escape(cert.date.trim()),
        url: escape_url(&cert.url),
    }
}

/// Joins start and end with an en dash, dropping whichever half is blank.
fn date_range(start: &str, end: &str) -> Fragment {
    match (start.trim(), end.trim()) {
        ("", "") => Fragment::default(),
        (start, "") => escape(start),
        ("", end) => escape(end),
        (start, end) => escape(&format!("{} -- {}", start, end)),
    }
}

/// Strips the scheme and a trailing slash for display.
fn display_url(url: &str) -> &str {
    let url = url.trim();
    let url = url
        .strip_prefix("https://")
        .or_else(|| url.strip_prefix("http://"))
        .unwrap_or(url);
    url.strip_suffix('/').unwrap_or(url)
}

fn contacts(doc: &CvDocument) -> Vec<ContactView> {
    let mut out = Vec::new();
    let mut push = |kind: &'static str, text: Fragment, href: Fragment| {
        if !text.is_empty() {
            out.push(ContactView { kind, text, href });
        }
    };

    let email = doc.email.trim();
    push("email", escape(email), escape_url(&format!("mailto:{}", email)));

    let phone = doc.phone.trim();
    let dialable: String = phone
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '+')
        .collect();
    push("phone", escape(phone), escape_url(&format!("tel:{}", dialable)));

    push("location", escape(doc.location.trim()), Fragment::default());

    let website = doc.website.trim();
    push(
        "website",
        escape(display_url(website)),
        escape_url(&with_scheme(website)),
    );

    let linkedin = doc.linkedin.trim();
    push(
        "linkedin",
        escape(profile_handle(linkedin)),
        escape_url(&profile_url("linkedin.com/in/", linkedin)),
    );

    let github = doc.github.trim();
    push(
        "github",
        escape(profile_handle(github)),
        escape_url(&profile_url("github.com/", github)),
    );

    out
}

fn with_scheme(url: &str) -> String {
    if url.contains("://") {
        url.to_string()
    } else {
        format!("https://{}", url)
    }
}

/// Accepts either a bare handle or a full profile URL.
fn profile_url(base: &str, value: &str) -> String {
    if value.contains('/') {
        with_scheme(value)
    } else {
        format!("https://{}{}", base, value)
    }
}

fn profile_handle(value: &str) -> &str {
    display_url(value).rsplit('/').next().unwrap_or(value)
}
