//! The parser driver
//!
//! [`Parser::next_sentence`] assembles the next logical line, parses it into
//! a [`Sentence`], validates it against the block grammar, applies the stack
//! action and assigns code labels. The caller drives it in a loop until it
//! returns `Ok(None)` at end of source.
//!
//! The whole rollback-relevant state lives in a [`ParserState`] value that
//! is snapshotted before every sentence; [`Parser::state_back`] restores the
//! snapshot so a caller can recover from a sentence-level error and try a
//! different path.

use tracing::debug;

use crate::blocks::{
    block_id, find_def, BlockAction, CodeBlock, CodeBlockDef, CodeBlockId, JumpMode,
    CODE_LABEL_LEN,
};
use crate::config::ParserConfig;
use crate::diag::Diag;
use crate::reader::{Origin, SourceReader};
use crate::sentence::{Sentence, SentenceKind};
use crate::state::ParserState;

#[derive(Debug)]
pub struct Parser {
    config: ParserConfig,
    reader: SourceReader,
    curr: ParserState,
    prev: ParserState,
}

impl Parser {
    /// Open a source file.
    pub fn open(file: &str, config: ParserConfig) -> Result<Parser, Diag> {
        let reader = SourceReader::open(file, config.tab_size)?;
        Ok(Self::with_reader(reader, config))
    }

    /// Read the whole of standard input as the source (linter mode).
    pub fn from_stdin(name: &str, config: ParserConfig) -> Result<Parser, Diag> {
        let reader = SourceReader::from_stdin(name, config.tab_size)?;
        Ok(Self::with_reader(reader, config))
    }

    /// Parse in-memory text under the given source name.
    pub fn from_source(name: &str, text: &str, config: ParserConfig) -> Parser {
        let lines = text
            .split('\n')
            .map(|l| l.strip_suffix('\r').unwrap_or(l).to_string())
            .collect();
        Self::with_reader(SourceReader::from_lines(name, lines, config.tab_size), config)
    }

    fn with_reader(reader: SourceReader, config: ParserConfig) -> Parser {
        let mut curr = ParserState::default();
        curr.block_stack.push(CodeBlockDef::new(CodeBlock::Init));
        Parser {
            config,
            reader,
            prev: curr.clone(),
            curr,
        }
    }

    /// Next classified sentence, or `None` at end of source. On error the
    /// state mutation that produced it stays visible; `state_back` restores
    /// the pre-call snapshot.
    pub fn next_sentence(&mut self) -> Result<Option<Sentence>, Diag> {
        self.prev = self.curr.clone();

        let Some((line, origin)) = self.reader.next_line()? else {
            return Ok(None);
        };
        let block = self.current_block();
        let sys_namespace = matches!(origin, Origin::Insertion | Origin::Addition);
        let mut sentence = Sentence::parse(
            self.reader.file(),
            self.reader.line_nr() + 1,
            &line,
            self.reader.cumul_len(),
            &self.curr.type_list,
            block,
            origin,
            sys_namespace,
            &self.config,
        )?;
        debug!("parsed sentence: {}", sentence.print());

        if sentence.kind == SentenceKind::Empty {
            return Ok(Some(sentence));
        }

        // Block grammar lookup: first row matching kind and enclosing block
        let Some(def) = find_def(sentence.kind, block) else {
            let message = format!(
                "Sentence {} is not allowed inside {} block",
                sentence.kind.name().to_lowercase(),
                block.name().to_lowercase()
            );
            return Err(match sentence.tokens.first() {
                Some(t) => Diag::at(&t.file, t.line, t.col, message),
                None => Diag::on_line(self.reader.file(), self.reader.line_nr() + 1, message),
            });
        };

        let mut popped: Option<CodeBlockDef> = None;
        match def.action {
            BlockAction::Keep => {}
            BlockAction::Push => {
                let new_block =
                    CodeBlockDef::new(def.new_block.expect("push row carries a block"));
                self.curr.block_stack.push(new_block);
                if def.push_del {
                    self.curr.del_stack.push(block_id(new_block));
                }
            }
            BlockAction::Pop => {
                let Some(closed) = self.curr.block_stack.pop() else {
                    return Err(self.line_err("Code block stack is empty"));
                };
                self.curr.closed_blocks.push(block_id(closed));
                if def.pop_del {
                    if let Some(deferred) = self.curr.del_stack.pop() {
                        self.curr.closed_blocks.push(deferred);
                    }
                }
                popped = Some(closed);
            }
            BlockAction::Replace => {
                let Some(closed) = self.curr.block_stack.pop() else {
                    return Err(self.line_err("Code block stack is empty"));
                };
                // Replaced blocks publish their end point, except the one
                // whose id is deferred on the deletion stack
                if self
                    .curr
                    .del_stack
                    .last()
                    .is_some_and(|top| *top != block_id(closed))
                {
                    self.curr.closed_blocks.push(block_id(closed));
                }
                self.curr.block_stack.push(CodeBlockDef {
                    block: def.new_block.expect("replace row carries a block"),
                    base_label: closed.base_label,
                    sub_label: closed.sub_label,
                });
                popped = Some(closed);
            }
        }

        let labels = match def.jump {
            JumpMode::None => *self.top(),

            // Opening a nested subroutine keeps counting; a top-level one
            // starts over
            JumpMode::BlockBeg => {
                let nested = self
                    .prev
                    .block_stack
                    .last()
                    .is_some_and(|d| d.block == CodeBlock::Local);
                if nested {
                    self.bump_global()?;
                } else {
                    self.curr.global_base_label = 0;
                }
                let base = self.curr.global_base_label;
                let top = self.top_mut();
                top.base_label = base;
                top.sub_label = 0;
                *top
            }

            JumpMode::LoopBeg | JumpMode::FirstCase => {
                self.bump_global()?;
                let base = self.curr.global_base_label;
                let top = self.top_mut();
                top.base_label = base;
                top.sub_label = 0;
                *top
            }

            JumpMode::NextCase | JumpMode::LastCase => {
                if self.top().sub_label == i16::MAX - 1 {
                    return Err(self.too_many_labels());
                }
                let top = self.top_mut();
                top.sub_label += 1;
                *top
            }

            // End sentences carry the labels of the block they closed
            JumpMode::BlockEnd | JumpMode::LoopEnd | JumpMode::EndCase => {
                popped.expect("end jump follows a pop")
            }
        };

        let top = self.top();
        if top.base_label.to_string().len() > CODE_LABEL_LEN
            || top.sub_label.to_string().len() > CODE_LABEL_LEN
        {
            return Err(self.too_many_labels());
        }

        // Innermost enclosing loop, the target for break/continue
        let mut loop_label = -1i32;
        let mut loop_id = "";
        for frame in self.curr.block_stack.iter().rev() {
            if frame.block.is_loop() {
                loop_label = frame.base_label as i32;
                loop_id = frame.block.jump_id();
                break;
            }
        }

        sentence.set_labels(
            labels.base_label as i32,
            labels.sub_label as i32,
            labels.block.jump_id(),
            loop_label,
            loop_id,
        );
        sentence.set_code_block_id(block_id(labels));
        debug!(
            "sentence labels: base={} sub={} block={{{}}} loop={} loop_id={{{}}}",
            labels.base_label,
            labels.sub_label,
            labels.block.jump_id(),
            loop_label,
            loop_id
        );

        Ok(Some(sentence))
    }

    /// Queue a line in the insertion buffer; it preempts the next source
    /// line and may use the system namespace.
    pub fn insert(&mut self, line: &str) {
        self.reader.insert(line);
    }

    /// Queue a line to run after the source ends.
    pub fn add(&mut self, line: &str) {
        self.reader.add(line, false);
    }

    /// Queue a line at the front of the addition buffer.
    pub fn add_first(&mut self, line: &str) {
        self.reader.add(line, true);
    }

    /// Restore the state snapshot taken before the last `next_sentence`.
    pub fn state_back(&mut self) {
        self.curr = self.prev.clone();
        debug!("parser state restored: {{{}}}", self.curr.print_blocks());
    }

    pub fn current_block(&self) -> CodeBlock {
        self.curr
            .block_stack
            .last()
            .map_or(CodeBlock::Init, |d| d.block)
    }

    /// Ids of blocks closed since the last clear, in closing order.
    pub fn closed_blocks(&self) -> &[CodeBlockId] {
        &self.curr.closed_blocks
    }

    pub fn clear_closed_blocks(&mut self) {
        self.curr.closed_blocks.clear();
    }

    /// Replace the known type list from a comma-delimited string.
    pub fn set_type_ids(&mut self, type_ids: &str) {
        self.curr.type_list = type_ids
            .split(',')
            .filter(|s| !s.is_empty())
            .map(|s| s.to_string())
            .collect();
        debug!("updated parser type list: {type_ids}");
    }

    /// Whether the module sets `library=true` before any section marker.
    pub fn library_option_found(&self) -> bool {
        self.reader.library_option_found()
    }

    /// The source line the last sentence came from, unsplit, for display.
    pub fn current_line(&self) -> &str {
        self.reader.display_line()
    }

    /// Drop all buffered lines and re-initialize the state.
    pub fn reset(&mut self) {
        self.reader.reset_buffers();
        self.curr.reset();
        self.curr.block_stack.push(CodeBlockDef::new(CodeBlock::Init));
        self.prev = self.curr.clone();
    }

    fn top(&self) -> &CodeBlockDef {
        self.curr.block_stack.last().expect("block stack is never empty")
    }

    fn top_mut(&mut self) -> &mut CodeBlockDef {
        self.curr
            .block_stack
            .last_mut()
            .expect("block stack is never empty")
    }

    fn bump_global(&mut self) -> Result<(), Diag> {
        if self.curr.global_base_label == i16::MAX - 1 {
            return Err(self.too_many_labels());
        }
        self.curr.global_base_label += 1;
        Ok(())
    }

    fn too_many_labels(&self) -> Diag {
        self.line_err("Too many code labels in module")
    }

    fn line_err(&self, message: &str) -> Diag {
        Diag::on_line(self.reader.file(), self.reader.line_nr() + 1, message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blocks::{block_def, LabelKind};
    use crate::token::TokenKind;
    use std::io::Write;

    fn parser(text: &str) -> Parser {
        Parser::from_source("test.dun", text, ParserConfig::default())
    }

    fn kinds(text: &str) -> Vec<SentenceKind> {
        let mut p = parser(text);
        let mut out = Vec::new();
        while let Some(stn) = p.next_sentence().unwrap() {
            out.push(stn.kind);
        }
        out
    }

    #[test]
    fn test_section_markers_replace_blocks() {
        let mut p = parser(".libs\n.public\n.private\n.implem");
        assert_eq!(p.current_block(), CodeBlock::Init);
        p.next_sentence().unwrap();
        assert_eq!(p.current_block(), CodeBlock::Libs);
        p.next_sentence().unwrap();
        assert_eq!(p.current_block(), CodeBlock::Public);
        p.next_sentence().unwrap();
        assert_eq!(p.current_block(), CodeBlock::Private);
        p.next_sentence().unwrap();
        assert_eq!(p.current_block(), CodeBlock::Implem);
        assert!(p.next_sentence().unwrap().is_none());
    }

    #[test]
    fn test_var_decl_in_public() {
        let mut p = parser(".public\nvar int x");
        p.set_type_ids("int,string");
        p.next_sentence().unwrap();
        let stn = p.next_sentence().unwrap().unwrap();
        assert_eq!(stn.kind, SentenceKind::VarDecl);
        assert_eq!(stn.tokens.len(), 3);
        assert!(!stn.is_static);
    }

    #[test]
    fn test_static_var_accepted_in_local_scope() {
        let mut p = parser(".implem\nmain:\nstatic var int x\n:main");
        p.set_type_ids("int");
        p.next_sentence().unwrap();
        p.next_sentence().unwrap();
        let stn = p.next_sentence().unwrap().unwrap();
        assert_eq!(stn.kind, SentenceKind::VarDecl);
        assert!(stn.is_static);
    }

    #[test]
    fn test_sentence_not_allowed_in_block() {
        // import is only legal inside .libs
        let mut p = parser(".public\nimport stuff");
        p.next_sentence().unwrap();
        let err = p.next_sentence().unwrap_err();
        assert!(err.message.contains("not allowed inside modpublic block"));
    }

    #[test]
    fn test_expression_rejected_at_module_level() {
        let mut p = parser("x = 1");
        let err = p.next_sentence().unwrap_err();
        assert!(err.message.contains("not allowed inside init block"));
    }

    #[test]
    fn test_main_resets_labels_and_loops_count_up() {
        let mut p = parser(".implem\nmain:\nwhile(x<10):\nbreak\n:while\n:main");
        p.next_sentence().unwrap();

        let main = p.next_sentence().unwrap().unwrap();
        assert_eq!(main.kind, SentenceKind::Main);
        assert_eq!((main.base_label(), main.sub_label()), (0, 0));

        let while_stn = p.next_sentence().unwrap().unwrap();
        assert_eq!(while_stn.kind, SentenceKind::While);
        assert_eq!(while_stn.base_label(), 1);
        assert_eq!(while_stn.label(LabelKind::LoopBeg), "00001whi-beg");
        assert_eq!(while_stn.label(LabelKind::LoopEnd), "00001whi-end");

        let brk = p.next_sentence().unwrap().unwrap();
        assert_eq!(brk.kind, SentenceKind::Break);
        assert!(brk.inside_loop());
        assert_eq!(brk.loop_label(), 1);
        assert_eq!(brk.label(LabelKind::LoopExit), "00001whi-exit");

        let end_while = p.next_sentence().unwrap().unwrap();
        assert_eq!(end_while.kind, SentenceKind::EndWhile);
        // End sentences carry the labels of the block they closed
        assert_eq!(end_while.base_label(), 1);

        let end_main = p.next_sentence().unwrap().unwrap();
        assert_eq!(end_main.kind, SentenceKind::EndMain);
        assert_eq!(end_main.base_label(), 0);
    }

    #[test]
    fn test_nested_function_bumps_global_counter() {
        let mut p = parser(".implem\nmain:\nfunc helper()\n:func\n:main");
        p.next_sentence().unwrap();
        p.next_sentence().unwrap();
        let func = p.next_sentence().unwrap().unwrap();
        assert_eq!(func.kind, SentenceKind::Function);
        // Nested subroutines keep counting instead of resetting
        assert_eq!(func.base_label(), 1);
    }

    #[test]
    fn test_if_elif_else_sub_labels() {
        let mut p = parser(".implem\nmain:\nif(x==1):\nelif(x==2):\nelse\n:if\n:main");
        p.next_sentence().unwrap();
        p.next_sentence().unwrap();

        let if_stn = p.next_sentence().unwrap().unwrap();
        assert_eq!(if_stn.kind, SentenceKind::If);
        assert_eq!((if_stn.base_label(), if_stn.sub_label()), (1, 0));
        assert_eq!(if_stn.label(LabelKind::CurrCond), "00001ifs-cond0");

        let elif = p.next_sentence().unwrap().unwrap();
        assert_eq!(elif.kind, SentenceKind::ElseIf);
        assert_eq!((elif.base_label(), elif.sub_label()), (1, 1));
        assert_eq!(elif.label(LabelKind::PrevCond), "00001ifs-cond0");
        assert_eq!(elif.label(LabelKind::NextCond), "00001ifs-cond2");

        let else_stn = p.next_sentence().unwrap().unwrap();
        assert_eq!(else_stn.kind, SentenceKind::Else);
        assert_eq!((else_stn.base_label(), else_stn.sub_label()), (1, 2));

        let end_if = p.next_sentence().unwrap().unwrap();
        assert_eq!(end_if.kind, SentenceKind::EndIf);
        assert_eq!((end_if.base_label(), end_if.sub_label()), (1, 2));
        assert_eq!(end_if.label(LabelKind::Exit), "00001ifs-exit");
    }

    #[test]
    fn test_switch_publishes_id_at_end_switch() {
        let mut p = parser(".implem\nmain:\nswitch(x)\nwhen 1:\nbreak\nwhen 2:\n:switch\n:main");
        p.next_sentence().unwrap();
        p.next_sentence().unwrap();
        p.clear_closed_blocks();

        let switch = p.next_sentence().unwrap().unwrap();
        assert_eq!(switch.kind, SentenceKind::Switch);
        let switch_id = block_id(CodeBlockDef::new(CodeBlock::Switch));

        let when1 = p.next_sentence().unwrap().unwrap();
        assert_eq!(when1.kind, SentenceKind::When);
        assert_eq!((when1.base_label(), when1.sub_label()), (1, 0));
        // The replaced switch block is deferred, not published
        assert!(p.closed_blocks().is_empty());

        let brk = p.next_sentence().unwrap().unwrap();
        assert_eq!(brk.kind, SentenceKind::Break);
        // A switch is not a loop target
        assert!(!brk.inside_loop());
        assert_eq!(brk.loop_label(), -1);

        let when2 = p.next_sentence().unwrap().unwrap();
        assert_eq!((when2.base_label(), when2.sub_label()), (1, 1));
        // First case published when the next one replaces it
        assert_eq!(p.closed_blocks().len(), 1);
        assert_eq!(block_def(p.closed_blocks()[0]).block, CodeBlock::FirstWhen);

        let end_switch = p.next_sentence().unwrap().unwrap();
        assert_eq!(end_switch.kind, SentenceKind::EndSwitch);
        // Closing publishes the last case and the deferred switch id
        let closed = p.closed_blocks();
        assert_eq!(closed.len(), 3);
        assert_eq!(block_def(closed[1]).block, CodeBlock::NextWhen);
        assert_eq!(closed[2], switch_id);
    }

    #[test]
    fn test_break_outside_loop_or_switch_is_rejected() {
        let mut p = parser(".implem\nmain:\nbreak\n:main");
        p.next_sentence().unwrap();
        p.next_sentence().unwrap();
        let err = p.next_sentence().unwrap_err();
        assert!(err.message.contains("not allowed inside local block"));
    }

    #[test]
    fn test_auto_split_produces_two_sentences() {
        let mut p = parser(".implem\nmain:\nif(a==1): b=c\n:if\n:main");
        p.next_sentence().unwrap();
        p.next_sentence().unwrap();

        let if_stn = p.next_sentence().unwrap().unwrap();
        assert_eq!(if_stn.kind, SentenceKind::If);
        assert_eq!(if_stn.origin(), Origin::Source);

        let expr = p.next_sentence().unwrap().unwrap();
        assert_eq!(expr.kind, SentenceKind::Expression);
        assert_eq!(expr.origin(), Origin::Split);
        // Columns still point into the original unsplit line
        assert_eq!(expr.tokens[0].col, 10);
        assert_eq!(p.current_line(), "if(a==1): b=c");
    }

    #[test]
    fn test_multiline_join_produces_one_sentence() {
        let mut p = parser(".implem\nmain:\na= \\\n  b\n:main");
        p.next_sentence().unwrap();
        p.next_sentence().unwrap();
        let stn = p.next_sentence().unwrap().unwrap();
        assert_eq!(stn.kind, SentenceKind::Expression);
        assert_eq!(stn.tokens.len(), 3);
        assert_eq!(stn.text(), "a=b");
    }

    #[test]
    fn test_raw_string_across_lines() {
        let mut p = parser(".implem\nmain:\nx = r\"[one\ntwo\nthree]\"\n:main");
        p.next_sentence().unwrap();
        p.next_sentence().unwrap();
        let stn = p.next_sentence().unwrap().unwrap();
        match &stn.tokens[2].kind {
            TokenKind::Str(s) => assert_eq!(s, "one\ntwo\nthree"),
            other => panic!("expected string, got {other:?}"),
        }
    }

    #[test]
    fn test_empty_sentence_for_splitter_only_fragment() {
        let mut p = parser(".implem\nmain:\nx=1;;y=2\n:main");
        p.next_sentence().unwrap();
        p.next_sentence().unwrap();
        assert_eq!(p.next_sentence().unwrap().unwrap().kind, SentenceKind::Expression);
        assert_eq!(p.next_sentence().unwrap().unwrap().kind, SentenceKind::Empty);
        assert_eq!(p.next_sentence().unwrap().unwrap().kind, SentenceKind::Expression);
    }

    #[test]
    fn test_insertion_preempts_source_and_may_use_namespace() {
        let mut p = parser(".implem\nmain:\nx=1\n:main");
        p.next_sentence().unwrap();
        p.next_sentence().unwrap();
        p.insert("$initvar y");
        let stn = p.next_sentence().unwrap().unwrap();
        assert_eq!(stn.kind, SentenceKind::InitVar);
        assert_eq!(stn.origin(), Origin::Insertion);
        // Source resumes afterwards
        let stn = p.next_sentence().unwrap().unwrap();
        assert_eq!(stn.kind, SentenceKind::Expression);
    }

    #[test]
    fn test_additions_drain_after_source() {
        let mut p = parser(".implem\nmain:\n:main");
        // Additions still classify against the block they land in, which is
        // Implem once :main closed
        p.add("func extra()");
        let mut all = Vec::new();
        loop {
            match p.next_sentence() {
                Ok(Some(stn)) => all.push((stn.kind, stn.origin())),
                Ok(None) => break,
                Err(e) => panic!("unexpected error: {e}"),
            }
        }
        assert_eq!(all.len(), 4);
        assert_eq!(all[3], (SentenceKind::Function, Origin::Addition));
    }

    #[test]
    fn test_state_back_restores_block_stack() {
        let mut p = parser(".implem\nmain:\n:main");
        p.next_sentence().unwrap();
        assert_eq!(p.current_block(), CodeBlock::Implem);
        p.next_sentence().unwrap();
        assert_eq!(p.current_block(), CodeBlock::Local);
        p.state_back();
        assert_eq!(p.current_block(), CodeBlock::Implem);
    }

    #[test]
    fn test_closed_blocks_accumulate_until_cleared() {
        let mut p = parser(".implem\nmain:\nif(x):\n:if\n:main");
        for _ in 0..4 {
            p.next_sentence().unwrap();
        }
        assert_eq!(p.closed_blocks().len(), 1);
        assert_eq!(block_def(p.closed_blocks()[0]).block, CodeBlock::If);
        p.next_sentence().unwrap();
        assert_eq!(p.closed_blocks().len(), 2);
        p.clear_closed_blocks();
        assert!(p.closed_blocks().is_empty());
    }

    #[test]
    fn test_enum_fields() {
        let mut p = parser(".public\nenum Color\nRed\nGreen\n:enum");
        assert_eq!(
            kinds_of(&mut p),
            vec![
                SentenceKind::Public,
                SentenceKind::DefEnum,
                SentenceKind::EnumField,
                SentenceKind::EnumField,
                SentenceKind::EndEnum
            ]
        );
    }

    fn kinds_of(p: &mut Parser) -> Vec<SentenceKind> {
        let mut out = Vec::new();
        while let Some(stn) = p.next_sentence().unwrap() {
            out.push(stn.kind);
        }
        out
    }

    #[test]
    fn test_full_module_walkthrough() {
        let text = "\
// demo module
.libs
import math as m
.public
var int total
.implem
main:
  var int i
  for(i=0; i<10; i++):
    total += i
  :for
:main
";
        let mut p = parser(text);
        p.set_type_ids("int");
        assert_eq!(
            kinds_of(&mut p),
            vec![
                SentenceKind::Libs,
                SentenceKind::Import,
                SentenceKind::Public,
                SentenceKind::VarDecl,
                SentenceKind::Implem,
                SentenceKind::Main,
                SentenceKind::VarDecl,
                SentenceKind::For,
                SentenceKind::Expression,
                SentenceKind::EndFor,
                SentenceKind::EndMain,
            ]
        );
    }

    #[test]
    fn test_kinds_helper_smoke() {
        assert_eq!(
            kinds(".libs\ninclude console"),
            vec![SentenceKind::Libs, SentenceKind::Include]
        );
    }

    #[test]
    fn test_open_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mod.dun");
        let mut f = std::fs::File::create(&path).unwrap();
        writeln!(f, ".public").unwrap();
        writeln!(f, "var int x").unwrap();
        drop(f);

        let mut p = Parser::open(path.to_str().unwrap(), ParserConfig::default()).unwrap();
        p.set_type_ids("int");
        let stn = p.next_sentence().unwrap().unwrap();
        assert_eq!(stn.kind, SentenceKind::Public);
        let stn = p.next_sentence().unwrap().unwrap();
        assert_eq!(stn.kind, SentenceKind::VarDecl);
        assert_eq!(stn.file_name(), path.to_str().unwrap());
    }

    #[test]
    fn test_open_missing_file_fails() {
        let err = Parser::open("/nonexistent/mod.dun", ParserConfig::default()).unwrap_err();
        assert!(err.message.contains("Cannot read source file"));
    }

    #[test]
    fn test_library_option() {
        let p = parser("set library = true\n.public");
        assert!(p.library_option_found());
        let p = parser(".public\nset library = true");
        assert!(!p.library_option_found());
    }

    #[test]
    fn test_reset_reinitializes() {
        let mut p = parser(".implem\nmain:");
        p.next_sentence().unwrap();
        p.next_sentence().unwrap();
        assert_eq!(p.current_block(), CodeBlock::Local);
        p.reset();
        assert_eq!(p.current_block(), CodeBlock::Init);
        assert!(p.next_sentence().unwrap().is_none());
    }
}
