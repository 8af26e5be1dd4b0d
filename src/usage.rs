#[cfg(not(feature = "std"))]
use crate::std;

use std::string::String;

use crate::Schema;
use unicode_segmentation::UnicodeSegmentation;

/*
  Format:
     USAGE
        ${prog} ${positional} [${optional positional}]

     DESCRIPTION:
        ${description}

     ARGUMENTS:
        ${name} -- ${description}

     OPTIONS:
        -${short}, --${long}     -- ${description}
*/
impl Schema {
    /// Renders the usage text for this schema, with `prog_name` as the invoked program.
    ///
    /// Names are padded to the widest name in their column, measured in graphemes.
    pub fn usage(&self, prog_name: &str) -> String {
        let pos_width = widest(self.positionals.iter().map(|p| p.name.as_str()));
        let short_width = widest(self.options.iter().filter_map(|o| o.short_name.as_deref()));
        let long_width = widest(self.options.iter().map(|o| o.long_name.as_str()));

        let mut usage = String::from("USAGE \n\t");
        usage.push_str(prog_name);
        usage.push(' ');
        for arg in &self.positionals {
            if arg.required {
                usage.push_str(&arg.name);
                usage.push(' ');
            } else {
                usage.push('[');
                usage.push_str(&arg.name);
                usage.push_str("] ");
            }
        }
        usage.push('\n');

        if let Some(description) = &self.prog_description {
            usage.push_str("\nDESCRIPTION:\n\t");
            usage.push_str(description);
            usage.push('\n');
        }

        usage.push_str("\nARGUMENTS:\n");
        for arg in &self.positionals {
            usage.push('\t');
            push_padded(&mut usage, &arg.name, pos_width);
            usage.push_str(" -- ");
            if let Some(description) = &arg.description {
                usage.push_str(description);
            }
            usage.push('\n');
        }

        usage.push_str("\nOPTIONS:\n");
        for opt in &self.options {
            match &opt.short_name {
                Some(short) => {
                    usage.push_str("\t-");
                    push_padded(&mut usage, short, short_width);
                    usage.push_str(", --");
                }
                None => usage.push_str("\t--"),
            }
            push_padded(&mut usage, &opt.long_name, long_width);
            usage.push(' ');
            if let Some(description) = &opt.description {
                usage.push_str("\t -- ");
                usage.push_str(description);
            }
            usage.push('\n');
        }
        usage.push('\n');
        usage
    }

    // the override wins, otherwise the invoked path minus its directories
    pub(crate) fn display_name(&self, argv0: Option<&str>) -> String {
        match (&self.prog_name, argv0) {
            (Some(name), _) => name.clone(),
            (None, Some(path)) => String::from(strip_path(path)),
            (None, None) => String::new(),
        }
    }
}

fn strip_path(path: &str) -> &str {
    path.rsplit(|c: char| c == '/' || c == '\\').next().unwrap_or(path)
}

fn width(s: &str) -> usize {
    s.graphemes(true).count()
}

fn widest<'a, I: Iterator<Item = &'a str>>(names: I) -> usize {
    names.map(width).max().unwrap_or(0)
}

fn push_padded(out: &mut String, s: &str, to: usize) {
    out.push_str(s);
    for _ in width(s)..to {
        out.push(' ');
    }
}

#[cfg(test)]
mod tests {
    use super::strip_path;
    use crate::{Schema, ValueKind};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_strip_path() {
        assert_eq!("prog", strip_path("/usr/bin/prog"));
        assert_eq!("prog.exe", strip_path("C:\\tools\\prog.exe"));
        assert_eq!("prog", strip_path("prog"));
        assert_eq!("", strip_path("dir/"));
    }

    #[test]
    fn test_display_name() {
        let mut schema = Schema::new();
        assert_eq!("prog", schema.display_name(Some("./bin/prog")));
        assert_eq!("", schema.display_name(None));
        schema.program_info(Some("tool"), None);
        assert_eq!("tool", schema.display_name(Some("./bin/prog")));
    }

    #[test]
    fn test_usage() {
        let mut schema = Schema::new();
        schema.program_info(None, Some("does things"));
        schema.add_positional(Some("file"), Some("input file"), ValueKind::String, true);
        schema.add_positional(None, None, ValueKind::Integer, false);
        schema.add_option(Some("v"), Some("verbose"), Some("be loud"), ValueKind::String, false);
        schema.add_option(None, Some("level"), None, ValueKind::Integer, true);
        assert_eq!(
            "USAGE \n\tprog file [arg2] \n\
             \nDESCRIPTION:\n\tdoes things\n\
             \nARGUMENTS:\n\tfile -- input file\n\targ2 -- \n\
             \nOPTIONS:\n\t-v, --verbose \t -- be loud\n\t--level   \n\n",
            schema.usage("prog")
        );
    }

    #[test]
    fn test_usage_empty_schema() {
        assert_eq!("USAGE \n\tprog \n\nARGUMENTS:\n\nOPTIONS:\n\n", Schema::new().usage("prog"));
    }

    #[test]
    fn test_usage_pads_by_grapheme() {
        let mut schema = Schema::new();
        schema.add_positional(Some("ñandú"), None, ValueKind::String, true);
        schema.add_positional(Some("ab"), Some("short"), ValueKind::String, true);
        schema.add_option(Some("Ẩ"), Some("accent"), None, ValueKind::String, false);
        schema.add_option(Some("xy"), Some("wide"), Some("two"), ValueKind::String, false);
        assert_eq!(
            "USAGE \n\tprog ñandú ab \n\
             \nARGUMENTS:\n\tñandú -- \n\tab    -- short\n\
             \nOPTIONS:\n\t-Ẩ , --accent \n\t-xy, --wide   \t -- two\n\n",
            schema.usage("prog")
        );
    }
}
