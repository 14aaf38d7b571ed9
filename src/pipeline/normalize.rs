//! Document normalisation: wrap TikZ fragments in a fixed standalone preamble.
//!
//! Input containing `\documentclass` is taken as a full document and passed
//! through untouched. Anything else is placed verbatim between a constant
//! preamble and `\end{document}`. The preamble never depends on the input.

use std::borrow::Cow;

/// Substring that marks a complete LaTeX document.
pub const FULL_DOCUMENT_MARKER: &str = "\\documentclass";

/// Preamble used for every fragment.
pub const PREAMBLE: &str = "\\documentclass[border=2pt]{standalone}
\\usepackage{tikz}
\\usepackage{pgfplots}
\\usepackage{amsmath}
\\usepackage{amssymb}
\\usepackage{xcolor}
\\usetikzlibrary{shapes,arrows,positioning,calc,decorations.pathreplacing,patterns,fit,backgrounds,mindmap,trees,arrows.meta,angles,quotes}
\\pgfplotsset{compat=1.18}

\\begin{document}
";

/// Closing lines appended after a fragment.
pub const POSTAMBLE: &str = "\n\\end{document}\n";

/// `true` if `markup` declares its own document class.
pub fn is_full_document(markup: &str) -> bool {
    markup.contains(FULL_DOCUMENT_MARKER)
}

/// Return the document to compile for `markup`.
pub fn normalize(markup: &str) -> Cow<'_, str> {
    if is_full_document(markup) {
        Cow::Borrowed(markup)
    } else {
        let mut doc = String::with_capacity(PREAMBLE.len() + markup.len() + POSTAMBLE.len());
        doc.push_str(PREAMBLE);
        doc.push_str(markup);
        doc.push_str(POSTAMBLE);
        Cow::Owned(doc)
    }
}
