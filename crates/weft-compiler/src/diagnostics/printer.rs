//! Builder-pattern printer for rendering diagnostics against their sources.

use std::fmt::Write;

use annotate_snippets::{AnnotationKind, Group, Level, Patch, Renderer, Snippet};
use rowan::TextRange;

use super::Diagnostics;
use super::message::{DiagnosticMessage, Severity};
use crate::{SourceId, SourceMap};

pub struct DiagnosticsPrinter<'d, 's> {
    diagnostics: &'d Diagnostics,
    sources: &'s SourceMap,
    colored: bool,
}

impl<'d, 's> DiagnosticsPrinter<'d, 's> {
    pub fn new(diagnostics: &'d Diagnostics, sources: &'s SourceMap) -> Self {
        Self {
            diagnostics,
            sources,
            colored: false,
        }
    }

    pub fn colored(mut self, value: bool) -> Self {
        self.colored = value;
        self
    }

    pub fn render(&self) -> String {
        let mut out = String::new();
        self.format(&mut out).expect("String write never fails");
        out
    }

    pub fn format(&self, w: &mut impl Write) -> std::fmt::Result {
        let renderer = if self.colored {
            Renderer::styled()
        } else {
            Renderer::plain()
        };

        for (i, diag) in self.diagnostics.iter().enumerate() {
            if i > 0 {
                w.write_char('\n')?;
            }
            match diag.span {
                Some(span) => self.format_snippet(w, &renderer, diag, span.source, span.range)?,
                None => write!(w, "{}: {}", diag.severity(), diag.message)?,
            }
        }

        Ok(())
    }

    fn format_snippet(
        &self,
        w: &mut impl Write,
        renderer: &Renderer,
        diag: &DiagnosticMessage,
        source: SourceId,
        range: TextRange,
    ) -> std::fmt::Result {
        let content = self.sources.content(source);
        let path = self.sources.path(source);
        let primary = adjust_range(range, content.len());

        let mut snippet = Snippet::source(content).line_start(1).annotation(
            AnnotationKind::Primary
                .span(primary.clone())
                .label(&diag.message),
        );

        if let Some(p) = path {
            snippet = snippet.path(p);
        }

        // related locations in the same source share the primary snippet
        let mut foreign = Vec::new();
        for related in &diag.related {
            if related.span.source == source {
                snippet = snippet.annotation(
                    AnnotationKind::Context
                        .span(adjust_range(related.span.range, content.len()))
                        .label(&related.message),
                );
            } else {
                foreign.push(related);
            }
        }

        let mut title_group = severity_to_level(diag.severity())
            .primary_title(&diag.message)
            .element(snippet);

        for related in foreign {
            let other = self.sources.content(related.span.source);
            let other_path = self.sources.kind(related.span.source).display_name();
            title_group = title_group.element(
                Snippet::source(other)
                    .line_start(1)
                    .path(other_path)
                    .annotation(
                        AnnotationKind::Context
                            .span(adjust_range(related.span.range, other.len()))
                            .label(&related.message),
                    ),
            );
        }

        let mut report: Vec<Group> = vec![title_group];

        if let Some(fix) = &diag.fix {
            report.push(
                Level::HELP.secondary_title(&fix.description).element(
                    Snippet::source(content)
                        .line_start(1)
                        .patch(Patch::new(primary, &fix.replacement)),
                ),
            );
        }

        write!(w, "{}", renderer.render(&report))
    }
}

fn severity_to_level(severity: Severity) -> Level<'static> {
    match severity {
        Severity::Error => Level::ERROR,
        Severity::Warning => Level::WARNING,
        Severity::Information => Level::INFO,
    }
}

fn adjust_range(range: TextRange, limit: usize) -> std::ops::Range<usize> {
    let start: usize = range.start().into();
    let end: usize = range.end().into();

    if start == end {
        return start..(start + 1).min(limit);
    }

    start..end
}

impl Diagnostics {
    pub fn printer<'d, 's>(&'d self, sources: &'s SourceMap) -> DiagnosticsPrinter<'d, 's> {
        DiagnosticsPrinter::new(self, sources)
    }

    pub fn render(&self, sources: &SourceMap) -> String {
        self.printer(sources).render()
    }

    pub fn render_colored(&self, sources: &SourceMap, colored: bool) -> String {
        self.printer(sources).colored(colored).render()
    }
}
