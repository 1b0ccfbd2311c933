mod common;

#[cfg(test)]
mod tests {
    use crate::common::{Call, Cursor, FakeCore, FakeWindow, item, open_at, trigger};
    use base64::Engine;
    use base64::engine::general_purpose::STANDARD as BASE64;
    use decompiler_menu::annotation::Annotation;
    use decompiler_menu::clipboard::MemoryClipboard;
    use decompiler_menu::context_menu::{
        ContextAction, DecompilerContextMenu, DialogRequest, ItemId, MenuContext, MenuOutcome,
        PromptPurpose,
    };
    use decompiler_menu::core::VariableDescription;
    use decompiler_menu::edits::PendingEdit;
    use decompiler_menu::window::ViewKind;

    struct Harness {
        core: FakeCore,
        window: FakeWindow,
        clipboard: MemoryClipboard,
        menu: DecompilerContextMenu,
    }

    impl Harness {
        fn new(core: FakeCore) -> Self {
            Self {
                core,
                window: FakeWindow::default(),
                clipboard: MemoryClipboard::default(),
                menu: DecompilerContextMenu::new(),
            }
        }

        fn open(&mut self, cursor: Cursor) {
            open_at(&mut self.menu, cursor, &self.core, &self.window);
        }

        fn trigger(&mut self, action: ContextAction) -> MenuOutcome {
            trigger(
                &mut self.menu,
                action,
                &mut self.core,
                &mut self.window,
                &mut self.clipboard,
            )
        }

        /// Feeds the dialog's confirmed input back, as the front-end does.
        fn confirm(&mut self, outcome: MenuOutcome, input: &str) -> MenuOutcome {
            match outcome {
                MenuOutcome::Dialog(DialogRequest::Prompt { purpose, .. }) => {
                    self.trigger(ContextAction::Apply(purpose.into_edit(input.to_string())))
                }
                other => panic!("expected a prompt, got {:?}", other),
            }
        }
    }

    fn on(annotation: Annotation, word: &'static str) -> Cursor {
        Cursor {
            annotation: Some(annotation),
            word,
            ..Cursor::default()
        }
    }

    #[test]
    fn test_add_name_to_unnamed_global() {
        let mut h = Harness::new(FakeCore::new());
        h.open(on(Annotation::GlobalVariable { offset: 0x4010 }, "data_4010"));
        assert_eq!(
            item(&h.menu, ItemId::RenameThingHere).name,
            "Add name to data_4010"
        );

        let prompt = h.trigger(ContextAction::RenameThingHere);
        h.confirm(prompt, "g_counter");
        assert_eq!(
            h.core.calls,
            vec![Call::AddFlag(0x4010, "g_counter".to_string(), 1)]
        );
    }

    #[test]
    fn test_rename_existing_flag() {
        let mut h = Harness::new(FakeCore::new().with_flag("g_counter", 0x404018));
        h.open(on(Annotation::GlobalVariable { offset: 0x404018 }, "g_counter"));
        let prompt = h.trigger(ContextAction::RenameThingHere);
        h.confirm(prompt, "g_total");
        assert_eq!(
            h.core.calls,
            vec![Call::RenameFlag("g_counter".to_string(), "g_total".to_string())]
        );
    }

    #[test]
    fn test_undefined_function_is_created_not_renamed() {
        let mut h = Harness::new(FakeCore::new());
        h.open(on(
            Annotation::FunctionName {
                name: "step".to_string(),
                offset: 0x4010c0,
            },
            "step",
        ));
        let prompt = h.trigger(ContextAction::RenameThingHere);
        match &prompt {
            MenuOutcome::Dialog(DialogRequest::Prompt { title, purpose, .. }) => {
                assert_eq!(title, "Define this function at 0x004010c0");
                assert_eq!(*purpose, PromptPurpose::DefineFunction { address: 0x4010c0 });
            }
            other => panic!("unexpected {:?}", other),
        }
        h.confirm(prompt, "step_counter");
        assert_eq!(
            h.core.calls,
            vec![Call::CreateFunction(0x4010c0, "step_counter".to_string())]
        );
    }

    #[test]
    fn test_defined_function_is_renamed_not_created() {
        let mut h = Harness::new(FakeCore::new().with_function("main", 0x401000));
        h.open(on(
            Annotation::FunctionName {
                name: "main".to_string(),
                offset: 0x401000,
            },
            "main",
        ));
        let prompt = h.trigger(ContextAction::RenameThingHere);
        h.confirm(prompt, "entry");
        assert_eq!(
            h.core.calls,
            vec![Call::RenameFunction(0x401000, "entry".to_string())]
        );
    }

    #[test]
    fn test_stale_variable_rename_is_refused() {
        let mut h = Harness::new(FakeCore::new().with_variable("count", "int"));
        h.open(on(
            Annotation::LocalVariable {
                name: "tmp_1".to_string(),
            },
            "tmp_1",
        ));
        match h.trigger(ContextAction::RenameThingHere) {
            MenuOutcome::Dialog(DialogRequest::Error { title, .. }) => {
                assert_eq!(title, "Rename local variable tmp_1");
            }
            other => panic!("expected an error dialog, got {:?}", other),
        }
        assert!(h.core.calls.is_empty());
        // The disabled row's shortcut does not fire either.
        let rename_key = crossterm::event::KeyEvent::new(
            crossterm::event::KeyCode::Char('n'),
            crossterm::event::KeyModifiers::NONE,
        );
        assert_eq!(h.menu.shortcut_action(&rename_key), None);
    }

    #[test]
    fn test_live_variable_rename_and_edit() {
        let mut h = Harness::new(FakeCore::new().with_variable("count", "int"));
        h.open(on(
            Annotation::LocalVariable {
                name: "count".to_string(),
            },
            "count",
        ));
        let prompt = h.trigger(ContextAction::RenameThingHere);
        h.confirm(prompt, "total");

        let edit = h.trigger(ContextAction::EditFunctionVariables);
        assert_eq!(
            edit,
            MenuOutcome::Dialog(DialogRequest::EditVariable {
                function: 0x401000,
                variable: VariableDescription {
                    name: "count".to_string(),
                    type_name: "int".to_string(),
                },
            })
        );
        assert_eq!(
            h.core.calls,
            vec![Call::RenameVariable(
                0x401000,
                "count".to_string(),
                "total".to_string()
            )]
        );
    }

    #[test]
    fn test_show_target_entry_is_never_duplicated() {
        let mut h = Harness::new(FakeCore::new().with_flag("g_counter", 0x404018));
        let targets = || {
            [
                on(Annotation::GlobalVariable { offset: 0x404018 }, "g_counter"),
                on(
                    Annotation::FunctionName {
                        name: "main".to_string(),
                        offset: 0x401000,
                    },
                    "main",
                ),
                on(Annotation::ConstantVariable { offset: 0x402000 }, "0x402000"),
            ]
        };
        for _ in 0..3 {
            for cursor in targets() {
                h.open(cursor);
                let count = h
                    .menu
                    .items
                    .iter()
                    .filter(|i| i.id == ItemId::ShowTarget)
                    .count();
                assert_eq!(count, 1);
                h.menu.about_to_hide();
            }
        }

        let names: Vec<&str> = h.menu.items.iter().map(|i| i.name.as_str()).collect();
        assert!(names.contains(&"Show 0x00402000 in"));

        // The entry sits right before the copy separator.
        let target = h.menu.items.iter().position(|i| i.id == ItemId::ShowTarget);
        let separator = h.menu.items.iter().position(|i| i.id == ItemId::CopySeparator);
        assert_eq!(target.map(|t| t + 1), separator);

        h.open(Cursor::default());
        assert!(h.menu.items.iter().all(|i| i.id != ItemId::ShowTarget));
    }

    #[test]
    fn test_show_target_uses_hint_for_views() {
        let mut h = Harness::new(FakeCore::new().with_flag("g_counter", 0x404018));
        h.open(on(Annotation::GlobalVariable { offset: 0x404018 }, "g_counter"));
        let target = item(&h.menu, ItemId::ShowTarget);
        assert_eq!(target.name, "Show g_counter in");
        let views: Vec<Option<ContextAction>> = target
            .submenu
            .as_ref()
            .map(|s| s.items.iter().map(|i| i.action.clone()).collect())
            .unwrap_or_default();
        assert_eq!(
            views,
            vec![Some(ContextAction::ShowIn {
                address: 0x404018,
                view: ViewKind::Hexdump
            })]
        );

        h.trigger(ContextAction::ShowIn {
            address: 0x404018,
            view: ViewKind::Hexdump,
        });
        assert_eq!(h.window.shown, vec![(0x404018, ViewKind::Hexdump)]);
    }

    #[test]
    fn test_copy_actions() {
        let mut h = Harness::new(FakeCore::new().with_function("main", 0x401000));
        h.open(on(
            Annotation::FunctionName {
                name: "main".to_string(),
                offset: 0x401000,
            },
            "main",
        ));
        assert_eq!(h.trigger(ContextAction::Copy), MenuOutcome::CopyRequested);
        assert_eq!(h.clipboard.contents, None);

        h.trigger(ContextAction::CopyInstructionAddress);
        assert_eq!(h.clipboard.contents.as_deref(), Some("0x00401010"));

        h.trigger(ContextAction::CopyReferenceAddress);
        assert_eq!(h.clipboard.contents.as_deref(), Some("0x00401000"));
    }

    #[test]
    fn test_comment_actions() {
        let mut h = Harness::new(FakeCore::new());
        h.open(Cursor::default());
        assert_eq!(
            h.trigger(ContextAction::AddComment),
            MenuOutcome::Dialog(DialogRequest::Comment {
                address: 0x401010,
                current: None,
            })
        );
        assert_eq!(h.trigger(ContextAction::DeleteComment), MenuOutcome::Done);
        assert!(h.core.calls.is_empty());

        h.trigger(ContextAction::Apply(PendingEdit::SetComment {
            address: 0x401010,
            text: "loop head".to_string(),
        }));
        h.trigger(ContextAction::DeleteComment);
        assert_eq!(
            h.core.calls,
            vec![
                Call::SetComment(0x401010, "loop head".to_string()),
                Call::DelComment(0x401010),
            ]
        );
    }

    #[test]
    fn test_edit_annotation_encodes_and_refreshes() {
        let mut core = FakeCore::new();
        core.annotation_blob = "[]".to_string();
        let mut h = Harness::new(core);
        h.open(Cursor::default());

        let outcome = h.trigger(ContextAction::EditAnnotation);
        let (function, text) = match outcome {
            MenuOutcome::Dialog(DialogRequest::TextEdit { function, text, .. }) => {
                (function, text)
            }
            other => panic!("unexpected {:?}", other),
        };
        assert_eq!(text, "[]");

        h.trigger(ContextAction::Apply(PendingEdit::SetAnnotations {
            function,
            text: "[{\"text\": \"\"}]".to_string(),
        }));
        assert_eq!(
            h.core.calls,
            vec![Call::SetAnnotationBlob(
                0x401000,
                BASE64.encode("[{\"text\": \"\"}]")
            )]
        );
        assert_eq!(h.window.refreshes, 1);
    }

    #[test]
    fn test_xrefs_and_delete_name_need_a_reference() {
        let mut h = Harness::new(FakeCore::new().with_flag("g_counter", 0x404018));
        h.open(Cursor::default());
        assert_eq!(h.trigger(ContextAction::XRefs), MenuOutcome::Done);
        assert_eq!(h.trigger(ContextAction::DeleteName), MenuOutcome::Done);

        h.open(on(Annotation::GlobalVariable { offset: 0x404018 }, "g_counter"));
        match h.trigger(ContextAction::XRefs) {
            MenuOutcome::Dialog(DialogRequest::XRefs {
                address, refs, ..
            }) => {
                assert_eq!(address, 0x404018);
                assert_eq!(refs.len(), 1);
            }
            other => panic!("unexpected {:?}", other),
        }
        h.trigger(ContextAction::DeleteName);
        assert_eq!(h.core.calls, vec![Call::DelFlag(0x404018)]);
    }

    #[test]
    fn test_core_failure_is_reported() {
        let mut h = Harness::new(
            FakeCore::new()
                .with_function("main", 0x401000)
                .with_function("printf", 0x401100),
        );
        h.open(Cursor::default());
        let mut ctx = MenuContext {
            core: &mut h.core,
            window: &mut h.window,
            clipboard: &mut h.clipboard,
        };
        let result = h.menu.trigger(
            &ContextAction::Apply(PendingEdit::RenameFunction {
                address: 0x401000,
                name: "printf".to_string(),
            }),
            &mut ctx,
        );
        assert!(result.is_err());
        assert!(h.core.calls.is_empty());
    }
}
