mod common;

#[cfg(test)]
mod tests {
    use crate::common::{Cursor, FakeCore, FakeWindow, item, open_at};
    use decompiler_menu::annotation::Annotation;
    use decompiler_menu::context_menu::{DecompilerContextMenu, ItemId};

    /// Expected state of the annotation-driven rows after opening.
    struct Expect {
        rename: Option<&'static str>,
        rename_disabled: bool,
        delete_name: Option<&'static str>,
        edit_variable: Option<&'static str>,
        xrefs: bool,
        copy_reference: Option<&'static str>,
        tooltips: bool,
    }

    const HIDDEN: Expect = Expect {
        rename: None,
        rename_disabled: false,
        delete_name: None,
        edit_variable: None,
        xrefs: false,
        copy_reference: None,
        tooltips: false,
    };

    fn core() -> FakeCore {
        FakeCore::new()
            .with_function("main", 0x401000)
            .with_flag("g_counter", 0x404018)
            .with_flag("LIMIT", 0x402000)
            .with_variable("count", "int")
    }

    fn check(case: &str, annotation: Option<Annotation>, word: &'static str, expect: Expect) {
        let separator = !matches!(annotation, None | Some(Annotation::ConstantVariable { .. }));
        let core = core();
        let window = FakeWindow::default();
        let mut menu = DecompilerContextMenu::new();
        open_at(
            &mut menu,
            Cursor {
                annotation,
                word,
                ..Cursor::default()
            },
            &core,
            &window,
        );

        let rename = item(&menu, ItemId::RenameThingHere);
        assert_eq!(rename.visible, expect.rename.is_some(), "{case}: rename visibility");
        if let Some(label) = expect.rename {
            assert_eq!(rename.name, label, "{case}: rename label");
        }
        assert_eq!(rename.disabled, expect.rename_disabled, "{case}: rename enablement");
        assert_eq!(
            item(&menu, ItemId::CopySeparator).visible,
            separator,
            "{case}: copy separator"
        );

        let delete_name = item(&menu, ItemId::DeleteName);
        assert_eq!(delete_name.visible, expect.delete_name.is_some(), "{case}: delete name");
        if let Some(label) = expect.delete_name {
            assert_eq!(delete_name.name, label, "{case}: delete name label");
        }

        let edit_variable = item(&menu, ItemId::EditFunctionVariables);
        assert_eq!(
            edit_variable.visible,
            expect.edit_variable.is_some(),
            "{case}: edit variable"
        );
        if let Some(label) = expect.edit_variable {
            assert_eq!(edit_variable.name, label, "{case}: edit variable label");
            assert_eq!(edit_variable.disabled, expect.rename_disabled, "{case}: edit enablement");
        }

        assert_eq!(item(&menu, ItemId::XRefs).visible, expect.xrefs, "{case}: x-refs");

        let copy_reference = item(&menu, ItemId::CopyReferenceAddress);
        assert_eq!(
            copy_reference.visible,
            expect.copy_reference.is_some(),
            "{case}: copy reference"
        );
        if let Some(label) = expect.copy_reference {
            assert_eq!(copy_reference.name, label, "{case}: copy reference label");
        }

        assert_eq!(menu.tooltips_visible(), expect.tooltips, "{case}: tooltips");
    }

    #[test]
    fn test_no_annotation() {
        check("none", None, "", HIDDEN);
    }

    #[test]
    fn test_function_name_defined_and_undefined() {
        check(
            "defined function",
            Some(Annotation::FunctionName {
                name: "main".to_string(),
                offset: 0x401000,
            }),
            "main",
            Expect {
                rename: Some("Rename function main"),
                xrefs: true,
                copy_reference: Some("Copy address of main (0x00401000)"),
                ..HIDDEN
            },
        );
        check(
            "undefined function",
            Some(Annotation::FunctionName {
                name: "step".to_string(),
                offset: 0x4010c0,
            }),
            "step",
            Expect {
                rename: Some("Rename function step"),
                xrefs: true,
                copy_reference: Some("Copy address of step (0x004010c0)"),
                ..HIDDEN
            },
        );
    }

    #[test]
    fn test_global_variable_with_and_without_flag() {
        check(
            "named global",
            Some(Annotation::GlobalVariable { offset: 0x404018 }),
            "g_counter",
            Expect {
                rename: Some("Rename g_counter"),
                delete_name: Some("Remove g_counter"),
                xrefs: true,
                copy_reference: Some("Copy address of g_counter (0x00404018)"),
                ..HIDDEN
            },
        );
        check(
            "unnamed global",
            Some(Annotation::GlobalVariable { offset: 0x4010 }),
            "data_4010",
            Expect {
                rename: Some("Add name to data_4010"),
                xrefs: true,
                copy_reference: Some("Copy address (0x00004010)"),
                ..HIDDEN
            },
        );
    }

    #[test]
    fn test_constant_with_and_without_flag() {
        check(
            "named constant",
            Some(Annotation::ConstantVariable { offset: 0x402000 }),
            "LIMIT",
            Expect {
                xrefs: true,
                copy_reference: Some("Copy address of LIMIT (0x00402000)"),
                ..HIDDEN
            },
        );
        check(
            "plain constant",
            Some(Annotation::ConstantVariable { offset: 0x402010 }),
            "0x402010",
            Expect {
                xrefs: true,
                copy_reference: Some("Copy address (0x00402010)"),
                ..HIDDEN
            },
        );
    }

    #[test]
    fn test_local_variable_live_and_stale() {
        check(
            "live local",
            Some(Annotation::LocalVariable {
                name: "count".to_string(),
            }),
            "count",
            Expect {
                rename: Some("Rename variable count"),
                edit_variable: Some("Edit variable count"),
                ..HIDDEN
            },
        );
        check(
            "stale local",
            Some(Annotation::LocalVariable {
                name: "tmp_1".to_string(),
            }),
            "tmp_1",
            Expect {
                rename: Some("Rename variable tmp_1"),
                rename_disabled: true,
                edit_variable: Some("Edit variable tmp_1"),
                tooltips: true,
                ..HIDDEN
            },
        );
    }

    #[test]
    fn test_function_parameter_behaves_like_local() {
        check(
            "stale parameter",
            Some(Annotation::FunctionParameter {
                name: "argc".to_string(),
            }),
            "argc",
            Expect {
                rename: Some("Rename variable argc"),
                rename_disabled: true,
                edit_variable: Some("Edit variable argc"),
                tooltips: true,
                ..HIDDEN
            },
        );
    }

    #[test]
    fn test_other_annotation_keeps_copy_separator() {
        // Separator shown, rename hidden, no reference rows.
        check("other", Some(Annotation::Other), "while", HIDDEN);
    }

    #[test]
    fn test_comment_rows_follow_line_address() {
        let mut core = core();
        core.comments.insert(0x401010, "loop".to_string());
        let window = FakeWindow::default();
        let mut menu = DecompilerContextMenu::new();

        open_at(&mut menu, Cursor::default(), &core, &window);
        assert_eq!(item(&menu, ItemId::AddComment).name, "Edit Comment");
        assert!(item(&menu, ItemId::DeleteComment).visible);

        open_at(
            &mut menu,
            Cursor {
                first_offset: Some(0x401014),
                ..Cursor::default()
            },
            &core,
            &window,
        );
        assert_eq!(item(&menu, ItemId::AddComment).name, "Add Comment");
        assert!(!item(&menu, ItemId::DeleteComment).visible);

        open_at(
            &mut menu,
            Cursor {
                first_offset: None,
                ..Cursor::default()
            },
            &core,
            &window,
        );
        assert!(!item(&menu, ItemId::AddComment).visible);
        assert!(!item(&menu, ItemId::DeleteComment).visible);
        assert!(!item(&menu, ItemId::ShowIn).visible);
    }

    #[test]
    fn test_close_restores_defaults_but_keeps_xrefs() {
        let core = core();
        let window = FakeWindow::default();
        let mut menu = DecompilerContextMenu::new();
        open_at(
            &mut menu,
            Cursor {
                annotation: Some(Annotation::LocalVariable {
                    name: "tmp_1".to_string(),
                }),
                ..Cursor::default()
            },
            &core,
            &window,
        );
        menu.about_to_hide();

        let rename = item(&menu, ItemId::RenameThingHere);
        assert!(rename.visible && !rename.disabled);
        let edit = item(&menu, ItemId::EditFunctionVariables);
        assert!(edit.visible && !edit.disabled);
        assert!(item(&menu, ItemId::AddComment).visible);
        assert!(!menu.tooltips_visible());

        open_at(
            &mut menu,
            Cursor {
                annotation: Some(Annotation::GlobalVariable { offset: 0x404018 }),
                word: "g_counter",
                first_offset: None,
                ..Cursor::default()
            },
            &core,
            &window,
        );
        assert!(item(&menu, ItemId::DeleteName).visible);
        menu.about_to_hide();
        assert!(!item(&menu, ItemId::DeleteName).visible);
        assert!(item(&menu, ItemId::AddComment).visible);
        // X-Refs keeps whatever the last open decided.
        assert!(item(&menu, ItemId::XRefs).visible);
    }

    #[test]
    fn test_debug_menu_and_pc_label() {
        let mut core = core();
        let window = FakeWindow::default();
        let mut menu = DecompilerContextMenu::new();

        open_at(&mut menu, Cursor::default(), &core, &window);
        assert!(!item(&menu, ItemId::DebugMenu).visible);

        core.debugging = true;
        core.pc_register = "pc".to_string();
        open_at(&mut menu, Cursor::default(), &core, &window);
        assert!(item(&menu, ItemId::DebugMenu).visible);
        assert_eq!(item(&menu, ItemId::SetPc).name, "Set PC here");
        assert_eq!(
            item(&menu, ItemId::CopyInstructionAddress).name,
            "Copy address (0x00401010)"
        );
    }
}
