//! Shared test fixture: a minimal single-target iOS project in exactly the
//! canonical form the writer produces.

pub const MINI_PROJECT: &str = r#"// !$*UTF8*$!
{
	archiveVersion = 1;
	classes = {
	};
	objectVersion = 46;
	objects = {

/* Begin PBXBuildFile section */
		4C0A1B2C19C0000100ABCDEF /* main.m in Sources */ = {isa = PBXBuildFile; fileRef = 4C0A1B2E19C0000100ABCDEF /* main.m */; };
/* End PBXBuildFile section */

/* Begin PBXFileReference section */
		4C0A1B2D19C0000100ABCDEF /* MiniApp.app */ = {isa = PBXFileReference; explicitFileType = wrapper.application; includeInIndex = 0; path = MiniApp.app; sourceTree = BUILT_PRODUCTS_DIR; };
		4C0A1B2E19C0000100ABCDEF /* main.m */ = {isa = PBXFileReference; lastKnownFileType = sourcecode.c.objc; path = main.m; sourceTree = "<group>"; };
/* End PBXFileReference section */

/* Begin PBXGroup section */
		4C0A1B2F19C0000100ABCDEF = {
			isa = PBXGroup;
			children = (
				4C0A1B3119C0000100ABCDEF /* Source */,
				4C0A1B3019C0000100ABCDEF /* Products */,
			);
			sourceTree = "<group>";
		};
		4C0A1B3019C0000100ABCDEF /* Products */ = {
			isa = PBXGroup;
			children = (
				4C0A1B2D19C0000100ABCDEF /* MiniApp.app */,
			);
			name = Products;
			sourceTree = "<group>";
		};
		4C0A1B3119C0000100ABCDEF /* Source */ = {
			isa = PBXGroup;
			children = (
				4C0A1B2E19C0000100ABCDEF /* main.m */,
			);
			path = Source;
			sourceTree = "<group>";
		};
/* End PBXGroup section */

/* Begin PBXNativeTarget section */
		4C0A1B3219C0000100ABCDEF /* MiniApp */ = {
			isa = PBXNativeTarget;
			buildConfigurationList = 4C0A1B3819C0000100ABCDEF /* Build configuration list for PBXNativeTarget "MiniApp" */;
			buildPhases = (
				4C0A1B3419C0000100ABCDEF /* Sources */,
			);
			buildRules = (
			);
			dependencies = (
			);
			name = MiniApp;
			productName = MiniApp;
			productReference = 4C0A1B2D19C0000100ABCDEF /* MiniApp.app */;
			productType = "com.apple.product-type.application";
		};
/* End PBXNativeTarget section */

/* Begin PBXProject section */
		4C0A1B3319C0000100ABCDEF /* Project object */ = {
			isa = PBXProject;
			attributes = {
				LastUpgradeCheck = 0600;
			};
			buildConfigurationList = 4C0A1B3719C0000100ABCDEF /* Build configuration list for PBXProject "MiniProject" */;
			compatibilityVersion = "Xcode 3.2";
			developmentRegion = English;
			hasScannedForEncodings = 0;
			knownRegions = (
				en,
			);
			mainGroup = 4C0A1B2F19C0000100ABCDEF;
			productRefGroup = 4C0A1B3019C0000100ABCDEF /* Products */;
			projectDirPath = "";
			projectRoot = "";
			targets = (
				4C0A1B3219C0000100ABCDEF /* MiniApp */,
			);
		};
/* End PBXProject section */

/* Begin PBXSourcesBuildPhase section */
		4C0A1B3419C0000100ABCDEF /* Sources */ = {
			isa = PBXSourcesBuildPhase;
			buildActionMask = 2147483647;
			files = (
				4C0A1B2C19C0000100ABCDEF /* main.m in Sources */,
			);
			runOnlyForDeploymentPostprocessing = 0;
		};
/* End PBXSourcesBuildPhase section */

/* Begin XCBuildConfiguration section */
		4C0A1B3519C0000100ABCDEF /* Debug */ = {
			isa = XCBuildConfiguration;
			buildSettings = {
				ALWAYS_SEARCH_USER_PATHS = NO;
				GCC_C_LANGUAGE_STANDARD = gnu99;
				ONLY_ACTIVE_ARCH = YES;
				SDKROOT = iphoneos;
			};
			name = Debug;
		};
		4C0A1B3619C0000100ABCDEF /* Debug */ = {
			isa = XCBuildConfiguration;
			buildSettings = {
				INFOPLIST_FILE = "Source/MiniApp-Info.plist";
				PRODUCT_NAME = "$(TARGET_NAME)";
			};
			name = Debug;
		};
/* End XCBuildConfiguration section */

/* Begin XCConfigurationList section */
		4C0A1B3719C0000100ABCDEF /* Build configuration list for PBXProject "MiniProject" */ = {
			isa = XCConfigurationList;
			buildConfigurations = (
				4C0A1B3519C0000100ABCDEF /* Debug */,
			);
			defaultConfigurationIsVisible = 0;
			defaultConfigurationName = Debug;
		};
		4C0A1B3819C0000100ABCDEF /* Build configuration list for PBXNativeTarget "MiniApp" */ = {
			isa = XCConfigurationList;
			buildConfigurations = (
				4C0A1B3619C0000100ABCDEF /* Debug */,
			);
			defaultConfigurationIsVisible = 0;
			defaultConfigurationName = Debug;
		};
/* End XCConfigurationList section */
	};
	rootObject = 4C0A1B3319C0000100ABCDEF /* Project object */;
}
"#;
